//! Model Worker
//!
//! A worker process launched by a coordinator. It instantiates one
//! inference handler, loads its model, serves `POST /predict` on loopback
//! and reports readiness back to the coordinator.
//!
//! # Example
//!
//! ```ignore
//! use model_worker::{bootstrap, config::{NotifierConfig, WorkerConfig}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), model_worker::WorkerError> {
//!     let config = WorkerConfig {
//!         worker_id: "worker-1".to_string(),
//!         model_path: "/models/echo".into(),
//!         port: 8101,
//!         handler_path: "handlers/echo.json".into(),
//!         notifier: NotifierConfig::from_env(),
//!         shutdown_grace: std::time::Duration::from_secs(5),
//!     };
//!     bootstrap::run(config).await
//! }
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod notifier;
pub mod server;

// Re-export main types for convenience
pub use bootstrap::{BoundWorker, Worker};
pub use error::WorkerError;
pub use notifier::{NotifyError, ReadyNotifier};
pub use server::{AppState, PredictError};
