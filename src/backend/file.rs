//! File backend: INI-style sections written in TOML syntax.
//!
//! ```toml
//! name = "Config Handler"
//! shortCut = "Ctrl+S"
//!
//! [Recent]
//! first = "/home/user/a.png"
//! ```
//!
//! Every read parses the file afresh so external edits are seen immediately;
//! every write is read-modify-write.
//!
//! A hand-written `[General]` section is the default group: its entries are
//! read as top-level keys and written back at the top level.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use toml::Table;

use crate::backend::{key_segments, SettingsBackend, DEFAULT_GROUP, GROUP_SEPARATOR};
use crate::error::BackendError;
use crate::handler::RawValue;

/// Settings stored in a single TOML file.
#[derive(Debug, Clone)]
pub struct TomlFileBackend {
    path: PathBuf,
}

impl TomlFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parsed document with the default group folded into the top level; a
    /// missing file is an empty document.
    fn load(&self) -> Result<Table, BackendError> {
        let table = match fs::read_to_string(&self.path) {
            Ok(content) => content
                .parse::<Table>()
                .map_err(|source| BackendError::Parse {
                    path: self.path.clone(),
                    source,
                })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Table::new(),
            Err(source) => return Err(self.io_error(source)),
        };
        Ok(fold_default_group(table))
    }

    fn store(&self, table: &Table) -> Result<(), BackendError> {
        self.ensure_parent()?;
        let content = toml::to_string(table)?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    fn ensure_parent(&self) -> Result<(), BackendError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))
            }
            _ => Ok(()),
        }
    }

    fn io_error(&self, source: std::io::Error) -> BackendError {
        BackendError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsBackend for TomlFileBackend {
    fn file_path(&self) -> &Path {
        &self.path
    }

    fn get(&self, key: &str) -> Result<Option<RawValue>, BackendError> {
        let segments = key_segments(key)?;
        let table = self.load()?;
        let Some((last, groups)) = segments.split_last() else {
            return Ok(None);
        };

        let mut current = &table;
        for group in groups {
            match current.get(*group) {
                Some(RawValue::Table(inner)) => current = inner,
                _ => return Ok(None),
            }
        }
        match current.get(*last) {
            Some(RawValue::Table(_)) | None => Ok(None),
            Some(value) => Ok(Some(value.clone())),
        }
    }

    fn set(&mut self, key: &str, value: RawValue) -> Result<(), BackendError> {
        let segments = key_segments(key)?;
        let mut table = self.load()?;
        let Some((last, groups)) = segments.split_last() else {
            return Err(BackendError::InvalidKey(key.to_string()));
        };

        let mut current = &mut table;
        for group in groups {
            let entry = current
                .entry(group.to_string())
                .or_insert_with(|| RawValue::Table(Table::new()));
            match entry {
                RawValue::Table(inner) => current = inner,
                _ => return Err(BackendError::InvalidKey(key.to_string())),
            }
        }
        if matches!(current.get(*last), Some(RawValue::Table(_))) {
            return Err(BackendError::InvalidKey(key.to_string()));
        }
        current.insert(last.to_string(), value);

        self.store(&table)
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        let segments = key_segments(key)?;
        if !self.exists() {
            return Ok(());
        }
        let mut table = self.load()?;
        if remove_path(&mut table, &segments) {
            self.store(&table)?;
        }
        Ok(())
    }

    fn all_keys(&self) -> Result<Vec<String>, BackendError> {
        let table = self.load()?;
        let mut keys = Vec::new();
        collect_keys(&table, "", &mut keys);
        Ok(keys)
    }

    fn flush(&mut self) -> Result<(), BackendError> {
        // Writes go straight to disk; nothing is buffered.
        Ok(())
    }

    fn touch(&self) -> Result<(), BackendError> {
        if self.exists() {
            return Ok(());
        }
        self.ensure_parent()?;
        fs::write(&self.path, "").map_err(|e| self.io_error(e))
    }
}

/// Moves the entries of a `[General]` table to the top level. A top-level
/// entry wins over a `[General]` entry of the same name.
fn fold_default_group(mut table: Table) -> Table {
    let general = match table.remove(DEFAULT_GROUP) {
        Some(RawValue::Table(general)) => general,
        Some(other) => {
            table.insert(DEFAULT_GROUP.to_string(), other);
            return table;
        }
        None => return table,
    };
    for (name, value) in general {
        if table.contains_key(&name) {
            tracing::debug!(key = %name, "Top-level setting shadows [General] entry");
            continue;
        }
        table.insert(name, value);
    }
    table
}

/// Removes the entry at `segments`, pruning groups left empty.
/// Returns whether anything was removed.
fn remove_path(table: &mut Table, segments: &[&str]) -> bool {
    match segments {
        [] => false,
        [last] => table.remove(*last).is_some(),
        [group, rest @ ..] => {
            let Some(RawValue::Table(inner)) = table.get_mut(*group) else {
                return false;
            };
            let removed = remove_path(inner, rest);
            if removed && inner.is_empty() {
                table.remove(*group);
            }
            removed
        }
    }
}

fn collect_keys(table: &Table, prefix: &str, keys: &mut Vec<String>) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}{}{}", prefix, GROUP_SEPARATOR, name)
        };
        match value {
            RawValue::Table(inner) => collect_keys(inner, &key, keys),
            _ => keys.push(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, TomlFileBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = TomlFileBackend::new(dir.path().join("app").join("settings.toml"));
        (dir, backend)
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let (_dir, backend) = backend();
        assert!(!backend.exists());
        assert_eq!(backend.get("name").unwrap(), None);
        assert!(backend.all_keys().unwrap().is_empty());
    }

    #[test]
    fn test_set_get_and_groups() {
        let (_dir, mut backend) = backend();
        backend.set("name", RawValue::String("custom".into())).unwrap();
        backend.set("Recent/first", RawValue::String("a".into())).unwrap();
        backend.set("General/bogusKey", RawValue::String("1".into())).unwrap();

        assert!(backend.exists());
        assert_eq!(backend.get("name").unwrap(), Some(RawValue::String("custom".into())));
        assert_eq!(backend.get("bogusKey").unwrap(), Some(RawValue::String("1".into())));
        assert_eq!(backend.get("Recent").unwrap(), None);
        assert_eq!(
            backend.all_keys().unwrap(),
            vec!["Recent/first".to_string(), "bogusKey".to_string(), "name".to_string()]
        );

        let content = fs::read_to_string(backend.file_path()).unwrap();
        assert!(content.contains("[Recent]"));
    }

    #[test]
    fn test_set_rejects_section_collisions() {
        let (_dir, mut backend) = backend();
        backend.set("Recent/first", RawValue::String("a".into())).unwrap();
        assert!(matches!(
            backend.set("Recent", RawValue::Integer(1)),
            Err(BackendError::InvalidKey(_))
        ));
        backend.set("flag", RawValue::Boolean(true)).unwrap();
        assert!(matches!(
            backend.set("flag/inner", RawValue::Integer(1)),
            Err(BackendError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_remove_prunes_empty_groups() {
        let (_dir, mut backend) = backend();
        backend.set("Recent/first", RawValue::String("a".into())).unwrap();
        backend.set("name", RawValue::String("n".into())).unwrap();

        backend.remove("Recent/first").unwrap();
        assert_eq!(backend.all_keys().unwrap(), vec!["name".to_string()]);

        backend.remove("does/not/exist").unwrap();
        backend.remove("name").unwrap();
        assert!(backend.all_keys().unwrap().is_empty());
    }

    #[test]
    fn test_remove_group_removes_children() {
        let (_dir, mut backend) = backend();
        backend.set("Recent/first", RawValue::String("a".into())).unwrap();
        backend.set("Recent/second", RawValue::String("b".into())).unwrap();
        backend.remove("Recent").unwrap();
        assert!(backend.all_keys().unwrap().is_empty());
    }

    #[test]
    fn test_external_edits_are_visible() {
        let (_dir, mut backend) = backend();
        backend.set("name", RawValue::String("before".into())).unwrap();
        fs::write(backend.file_path(), "name = \"after\"\n").unwrap();
        assert_eq!(backend.get("name").unwrap(), Some(RawValue::String("after".into())));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let (_dir, backend) = backend();
        backend.touch().unwrap();
        fs::write(backend.file_path(), "name = = broken").unwrap();
        assert!(matches!(backend.get("name"), Err(BackendError::Parse { .. })));
        assert!(backend.all_keys().is_err());
    }

    #[test]
    fn test_touch_creates_empty_file_once() {
        let (_dir, mut backend) = backend();
        backend.touch().unwrap();
        assert!(backend.exists());
        backend.set("name", RawValue::String("kept".into())).unwrap();
        backend.touch().unwrap();
        assert_eq!(backend.get("name").unwrap(), Some(RawValue::String("kept".into())));
    }

    #[test]
    fn test_general_section_reads_as_top_level() {
        let (_dir, backend) = backend();
        backend.touch().unwrap();
        fs::write(
            backend.file_path(),
            "[General]\npath = \"/definitely/not/here\"\nname = \"user edit\"\n",
        )
        .unwrap();

        assert_eq!(
            backend.get("name").unwrap(),
            Some(RawValue::String("user edit".into()))
        );
        assert_eq!(
            backend.get("General/path").unwrap(),
            Some(RawValue::String("/definitely/not/here".into()))
        );
        assert_eq!(
            backend.all_keys().unwrap(),
            vec!["name".to_string(), "path".to_string()]
        );
    }

    #[test]
    fn test_general_section_is_rewritten_at_top_level() {
        let (_dir, mut backend) = backend();
        backend.touch().unwrap();
        fs::write(
            backend.file_path(),
            "name = \"top\"\n\n[General]\nname = \"shadowed\"\nshortCut = \"F5\"\n",
        )
        .unwrap();

        assert_eq!(backend.get("name").unwrap(), Some(RawValue::String("top".into())));
        backend.remove("shortCut").unwrap();

        let content = fs::read_to_string(backend.file_path()).unwrap();
        assert!(!content.contains("[General]"));
        assert_eq!(backend.all_keys().unwrap(), vec!["name".to_string()]);
    }

    #[test]
    fn test_scalar_named_general_is_kept() {
        let (_dir, mut backend) = backend();
        backend.set("General", RawValue::Integer(1)).unwrap();
        assert_eq!(backend.all_keys().unwrap(), vec!["General".to_string()]);
    }
}
