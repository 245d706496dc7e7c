//! Existing-directory checks and the well-known directory fallback search.

use std::path::{Path, PathBuf};

/// Candidate fallback directories, most preferred first: pictures, home, temp.
pub fn well_known_directories() -> Vec<PathBuf> {
    [dirs::picture_dir(), dirs::home_dir(), Some(std::env::temp_dir())]
        .into_iter()
        .flatten()
        .collect()
}

/// Non-empty path naming an existing directory.
pub(crate) fn check(text: &str) -> bool {
    !text.is_empty() && Path::new(text).is_dir()
}

/// First of `candidates` that currently exists as a directory.
pub(crate) fn first_existing<I>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    candidates.into_iter().find(|path| path.is_dir())
}
