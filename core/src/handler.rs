//! The two-operation capability every inference handler implements.

use serde_json::Value;
use std::path::Path;

use crate::HandlerError;

/// A pluggable inference unit owning a model reference.
///
/// Implementations are created once per process, loaded once, and then
/// driven sequentially by the worker's request path. Both operations may
/// block; callers run them off the async executor.
pub trait Handler: Send + 'static {
    /// Registered kind name, used for logging.
    fn name(&self) -> &str;

    /// Prepare the model found at `path`. On success `is_loaded` must
    /// return true afterwards.
    fn load_model(&mut self, path: &Path) -> Result<(), HandlerError>;

    /// Produce a prediction for one request payload.
    fn predict(&mut self, data: Value) -> Result<Value, HandlerError>;

    fn is_loaded(&self) -> bool;
}
