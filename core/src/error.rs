//! Error types shared by handlers and the handler registry.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`Handler`](crate::Handler) or while constructing one.
///
/// The `Display` form of an error returned from `predict` is sent verbatim
/// to the HTTP client, so messages should be readable on their own.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("model path {} does not exist", .0.display())]
    ModelPathNotFound(PathBuf),

    #[error("failed to load model: {0}")]
    LoadFailed(String),

    #[error("model not loaded")]
    NotLoaded,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Prediction(String),

    #[error("unknown handler '{name}' (registered: {available})")]
    UnknownHandler { name: String, available: String },

    #[error("invalid handler options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// Escape hatch for handler implementations built on `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised while reading a handler manifest file.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
