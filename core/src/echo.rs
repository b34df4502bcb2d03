//! Sample handler that echoes its input.
//!
//! Useful for wiring a coordinator end to end before a real model exists.
//! Loading sleeps for a configurable delay to mimic a slow model load.

use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::{Handler, HandlerError};

/// Default artificial load time (in milliseconds)
pub const DEFAULT_LOAD_DELAY_MS: u64 = 5_000;

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct EchoOptions {
    /// How long `load_model` sleeps before reporting success
    pub load_delay_ms: u64,

    /// Fail loading when the model path does not exist
    pub require_model_path: bool,
}

impl Default for EchoOptions {
    fn default() -> Self {
        Self {
            load_delay_ms: DEFAULT_LOAD_DELAY_MS,
            require_model_path: false,
        }
    }
}

pub struct EchoHandler {
    options: EchoOptions,
    model_loaded: bool,
}

impl EchoHandler {
    pub const KIND: &'static str = "echo";

    pub fn new() -> Self {
        Self::with_options(EchoOptions::default())
    }

    pub fn with_options(options: EchoOptions) -> Self {
        Self {
            options,
            model_loaded: false,
        }
    }
}

impl Default for EchoHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for EchoHandler {
    fn name(&self) -> &str {
        Self::KIND
    }

    fn load_model(&mut self, path: &Path) -> Result<(), HandlerError> {
        if self.options.require_model_path && !path.exists() {
            return Err(HandlerError::ModelPathNotFound(path.to_path_buf()));
        }

        debug!(delay_ms = self.options.load_delay_ms, "Simulating model load");
        std::thread::sleep(Duration::from_millis(self.options.load_delay_ms));

        self.model_loaded = true;
        info!(path = %path.display(), "Echo model ready");
        Ok(())
    }

    fn predict(&mut self, data: Value) -> Result<Value, HandlerError> {
        if !self.model_loaded {
            return Err(HandlerError::NotLoaded);
        }
        Ok(json!({ "predictions": data }))
    }

    fn is_loaded(&self) -> bool {
        self.model_loaded
    }
}
