use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// One or both input files are absent.
///
/// Recoverable: the dashboard degrades to a single warning instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("Data files not found. Please check file paths!")]
pub struct MissingDataFile {
    pub missing: Vec<PathBuf>,
}

impl MissingDataFile {
    pub fn new(missing: Vec<PathBuf>) -> Self {
        Self { missing }
    }
}

/// Malformed input. Not recovered locally; aborts the current refresh.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("{}: required column '{column}' not found in header", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: invalid UTF-8 on line {line}", .path.display())]
    InvalidUtf8 { path: PathBuf, line: u64 },
}

impl DataError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            DataError::MissingColumn { path, .. }
            | DataError::Csv { path, .. }
            | DataError::Io { path, .. }
            | DataError::InvalidUtf8 { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_message() {
        let err = MissingDataFile::new(vec![PathBuf::from("data/a.csv")]);
        assert_eq!(err.to_string(), "Data files not found. Please check file paths!");
    }

    #[test]
    fn test_missing_column_names_file_and_column() {
        let err = DataError::MissingColumn {
            path: PathBuf::from("data/orders.csv"),
            column: "Latitude".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("data/orders.csv"));
        assert!(msg.contains("Latitude"));
        assert_eq!(err.path(), std::path::Path::new("data/orders.csv"));
    }
}
