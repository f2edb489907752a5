//! Data provider error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum DataError {
    /// The configured data file does not exist.
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// No data file exists for the requested date.
    #[error("no data file for {date} in {}", dir.display())]
    NoDatedFile { dir: PathBuf, date: String },

    /// The data file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The provider holds no records.
    #[error("no records loaded")]
    Empty,
}
