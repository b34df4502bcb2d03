//! Worker Core Library
//!
//! Shared pieces used by the model worker process:
//! - The [`Handler`] contract every inference handler implements
//! - A [`HandlerRegistry`] mapping manifest names to handler factories
//! - The sample [`EchoHandler`]
//! - Tracing initialisation helpers

pub mod echo;
pub mod error;
pub mod handler;
pub mod manifest;
pub mod registry;

// Re-export commonly used items
pub use echo::{EchoHandler, EchoOptions};
pub use error::{HandlerError, ManifestError};
pub use handler::Handler;
pub use manifest::HandlerManifest;
pub use registry::{parse_options, HandlerFactory, HandlerRegistry};

fn default_filter(service_name: &str) -> String {
    format!("{service_name}=info,worker_core=info,tower_http=info")
}

/// Initialize tracing with standard configuration
pub fn init_tracing(service_name: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(service_name)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Initialize tracing with JSON output (for log collectors)
pub fn init_tracing_json(service_name: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(service_name)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();
}
