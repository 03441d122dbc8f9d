//! Cloud provider error types

use std::path::PathBuf;
use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("API error ({status}): {message}")]
    RemoteApi { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to load state from {}: {reason}", path.display())]
    StateLoad { path: PathBuf, reason: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error(transparent)]
    Config(#[from] tinyform_core::FlowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
