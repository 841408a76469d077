//! Error type shared by the converter and the import runner.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to read input file {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file {}: {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy script into container '{container}': {message}")]
    CopyFailed { container: String, message: String },

    /// `sqlcmd` exited non-zero; carries whatever it wrote to stderr.
    #[error("Import failed: {stderr}")]
    ExecuteFailed { stderr: String },

    #[error("Invalid config file {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Strict mode: {count} warnings generated")]
    Strict { count: usize },
}

impl MigrateError {
    /// Classify an I/O error raised while reading the input dump.
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            MigrateError::InputNotFound { path }
        } else {
            MigrateError::InputUnreadable { path, source }
        }
    }

    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MigrateError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_missing_input_maps_to_not_found() {
        let err = MigrateError::input("dump.sql", Error::new(ErrorKind::NotFound, "gone"));
        assert!(matches!(err, MigrateError::InputNotFound { .. }));
        assert_eq!(err.to_string(), "Input file not found: dump.sql");
    }

    #[test]
    fn test_other_read_errors_keep_source() {
        let err = MigrateError::input(
            "dump.sql",
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, MigrateError::InputUnreadable { .. }));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_execute_failed_carries_stderr() {
        let err = MigrateError::ExecuteFailed {
            stderr: "Login failed for user 'sa'.".to_string(),
        };
        assert_eq!(err.to_string(), "Import failed: Login failed for user 'sa'.");
    }
}
