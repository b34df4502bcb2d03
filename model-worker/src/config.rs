//! Worker configuration
//!
//! The coordinator launches each worker with four positional arguments.
//! Notifier tuning comes from the environment.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Coordinator port used when `SERVER_PORT` is unset
pub const DEFAULT_COORDINATOR_PORT: u16 = 7766;

/// Delay before the readiness notification is sent (in milliseconds)
pub const DEFAULT_NOTIFY_DELAY_MS: u64 = 1_000;

/// Request timeout for the readiness notification (in seconds)
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 500;

/// How long in-flight requests may run after an interrupt (in seconds)
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

/// Every socket this worker touches lives on loopback.
pub const LOOPBACK_HOST: &str = "127.0.0.1";

#[derive(Parser, Debug, Clone)]
#[command(name = "model-worker", version, about = "Serve a model handler over POST /predict")]
pub struct Cli {
    /// Identifier assigned by the coordinator
    pub worker_id: String,

    /// Model location handed to the handler's load_model
    pub model_path: PathBuf,

    /// Port to listen on (127.0.0.1)
    pub port: u16,

    /// Handler manifest file
    pub handler_path: PathBuf,
}

/// Readiness notifier configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifierConfig {
    pub coordinator_port: u16,
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            coordinator_port: DEFAULT_COORDINATOR_PORT,
            delay: Duration::from_millis(DEFAULT_NOTIFY_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}

impl NotifierConfig {
    /// Read configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unparseable values fall back
    /// to the defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let coordinator_port = lookup("SERVER_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COORDINATOR_PORT);
        let delay_ms = lookup("NOTIFY_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_NOTIFY_DELAY_MS);
        let timeout_secs = lookup("NOTIFY_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS);

        Self {
            coordinator_port,
            delay: Duration::from_millis(delay_ms),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn model_ready_url(&self) -> String {
        format!("http://{LOOPBACK_HOST}:{}/model-ready", self.coordinator_port)
    }
}

/// Drain period after Ctrl-C, from `SHUTDOWN_GRACE_SECS`.
pub fn shutdown_grace_from_env() -> Duration {
    shutdown_grace_from_vars(|key| std::env::var(key).ok())
}

pub fn shutdown_grace_from_vars<F>(lookup: F) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let secs = lookup("SHUTDOWN_GRACE_SECS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SHUTDOWN_GRACE_SECS);
    Duration::from_secs(secs)
}

/// Full worker configuration
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub worker_id: String,
    pub model_path: PathBuf,
    pub port: u16,
    pub handler_path: PathBuf,
    pub notifier: NotifierConfig,
    pub shutdown_grace: Duration,
}

impl WorkerConfig {
    pub fn from_cli(cli: Cli, notifier: NotifierConfig, shutdown_grace: Duration) -> Self {
        Self {
            worker_id: cli.worker_id,
            model_path: cli.model_path,
            port: cli.port,
            handler_path: cli.handler_path,
            notifier,
            shutdown_grace,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{LOOPBACK_HOST}:{}", self.port)
    }
}
