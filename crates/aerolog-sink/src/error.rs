//! Error types for the log sinks.
//!
//! All sink operations return [`SinkError`], which wraps the underlying
//! I/O error together with the file it concerns.

use std::path::PathBuf;

/// Errors that can occur while opening, writing or flushing a log.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Creating the output directory failed.
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Opening a log file failed.
    #[error("failed to open log file {}: {source}", path.display())]
    Open {
        /// The file that could not be opened.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Writing or flushing a row failed.
    #[error("failed to write {logger}: {source}")]
    Write {
        /// Name of the logger being written.
        logger: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
