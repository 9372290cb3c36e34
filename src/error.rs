//! Crate error type
//!
//! Only startup problems are errors. Sensor gaps and missing landmarks are
//! "no input this frame" and never surface here.

use std::path::PathBuf;

/// Errors surfaced at startup (settings, replay files)
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Replay error in {path}: {reason}")]
    Replay { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
