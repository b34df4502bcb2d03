//! Startup errors for the worker process.

use std::path::PathBuf;
use thiserror::Error;
use worker_core::{HandlerError, ManifestError};

use crate::notifier::NotifyError;

/// Errors that stop the worker before or while serving.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("{} does not exist or is not a file", .0.display())]
    HandlerFileMissing(PathBuf),

    #[error("invalid handler manifest: {0}")]
    Manifest(#[from] ManifestError),

    #[error("failed to create handler: {0}")]
    HandlerInit(#[source] HandlerError),

    #[error("failed to load model: {0}")]
    ModelLoad(#[source] HandlerError),

    #[error("model loading task failed: {0}")]
    LoadTask(#[from] tokio::task::JoinError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build readiness notifier: {0}")]
    Notifier(#[from] NotifyError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl WorkerError {
    /// Process exit status for this failure.
    pub const fn exit_code(&self) -> u8 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_message() {
        let err = WorkerError::HandlerFileMissing(PathBuf::from("handlers/absent.json"));
        assert_eq!(
            err.to_string(),
            "handlers/absent.json does not exist or is not a file"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_model_load_message() {
        let err = WorkerError::ModelLoad(HandlerError::LoadFailed("corrupt weights".to_string()));
        assert!(err.to_string().contains("corrupt weights"));
        assert_eq!(err.exit_code(), 1);
    }
}
