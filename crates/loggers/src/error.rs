//! Log sink errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while creating or driving a log sink.
#[derive(Debug, Error)]
pub enum LogError {
    /// The sink's output file could not be created.
    #[error("failed to create log file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external diagram renderer could not be launched or exited
    /// unsuccessfully.
    #[error("diagram renderer failed: {0}")]
    Renderer(String),
}
