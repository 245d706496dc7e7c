//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject names that cannot form a file path
//! - Validate value ranges (poll interval > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: StoreConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::StoreConfig;

/// A single semantic problem in a [`StoreConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &StoreConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.file.is_none() {
        check_name(&mut errors, "organization", &config.organization);
        check_name(&mut errors, "application", &config.application);
    }

    if let Some(file) = &config.file {
        if file.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "file",
                message: "must not be empty".to_string(),
            });
        }
    }

    if config.poll_interval_ms == 0 {
        errors.push(ValidationError {
            field: "poll_interval_ms",
            message: "must be greater than 0".to_string(),
        });
    }

    if config.logging.level.trim().is_empty() {
        errors.push(ValidationError {
            field: "logging.level",
            message: "must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_name(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError {
            field,
            message: "must not be empty".to_string(),
        });
    } else if value.contains(['/', '\\']) || value == "." || value == ".." {
        errors.push(ValidationError {
            field,
            message: format!("'{}' is not a valid path component", value),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&StoreConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = StoreConfig::default();
        config.organization = String::new();
        config.application = "a/b".into();
        config.poll_interval_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["organization", "application", "poll_interval_ms"]);
    }

    #[test]
    fn test_explicit_file_skips_name_checks() {
        let mut config = StoreConfig::default();
        config.organization = String::new();
        config.file = Some(PathBuf::from("settings.toml"));
        assert!(validate_config(&config).is_ok());
    }
}
