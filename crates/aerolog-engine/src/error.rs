//! Error types for the recorder binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the recorder run.

/// Top-level error for the recorder binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: aerolog_core::config::ConfigError,
    },

    /// The frame source could not be opened.
    #[error("source error: {source}")]
    Source {
        /// The underlying source error.
        #[from]
        source: aerolog_core::runner::SourceError,
    },

    /// Enabling or flushing the logs failed.
    #[error("sink error: {source}")]
    Sink {
        /// The underlying sink error.
        #[from]
        source: aerolog_sink::SinkError,
    },

    /// The recorder run failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: aerolog_core::runner::RunnerError,
    },

    /// The synthetic host configuration is invalid.
    #[error("synthetic host error: {message}")]
    Synthetic {
        /// Description of the problem.
        message: String,
    },

    /// A startup console command was rejected.
    #[error("command failed: {message}")]
    Command {
        /// The command's reply.
        message: String,
    },
}
