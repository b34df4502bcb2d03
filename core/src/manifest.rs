//! Handler manifest files.
//!
//! A manifest selects which registered handler a worker runs:
//!
//! ```json
//! { "handler": "echo", "options": { "load_delay_ms": 0 } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::ManifestError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HandlerManifest {
    /// Registered handler kind
    pub handler: String,

    /// Handler-specific options, `null` when omitted
    #[serde(default)]
    pub options: Value,
}

impl HandlerManifest {
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(handler: impl Into<String>, options: Value) -> Self {
        Self {
            handler: handler.into(),
            options,
        }
    }

    /// Read and parse a manifest file.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let raw = std::fs::read(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_slice(&raw).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
