//! Readiness notification
//!
//! Once the model is loaded the worker tells its coordinator it can take
//! traffic by POSTing `{"worker_id": "<id>"}` to `/model-ready`.
//!
//! Delivery is best effort: exactly one attempt, failures are logged and
//! otherwise ignored. The server keeps running either way.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, Instrument};

use crate::config::NotifierConfig;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to coordinator failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("coordinator rejected notification with status {0}")]
    Rejected(StatusCode),
}

/// Body of the readiness notification
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ModelReady {
    pub worker_id: String,
}

pub struct ReadyNotifier {
    client: reqwest::Client,
    url: String,
    worker_id: String,
    delay: Duration,
}

impl ReadyNotifier {
    /// Build a notifier targeting the coordinator on loopback.
    pub fn new(config: &NotifierConfig, worker_id: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(NotifyError::Client)?;

        Ok(Self {
            client,
            url: config.model_ready_url(),
            worker_id: worker_id.into(),
            delay: config.delay,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the notification once.
    pub async fn notify(&self) -> Result<(), NotifyError> {
        let payload = ModelReady {
            worker_id: self.worker_id.clone(),
        };

        debug!(url = %self.url, "Sending model ready notification");

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(NotifyError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status));
        }

        Ok(())
    }

    /// Run the notification on a detached task after the configured delay.
    ///
    /// The returned handle may be dropped; the task finishes on its own.
    pub fn spawn(self) -> JoinHandle<()> {
        let task = async move {
            tokio::time::sleep(self.delay).await;

            match self.notify().await {
                Ok(()) => info!(url = %self.url, "Coordinator notified"),
                Err(e) => error!(
                    url = %self.url,
                    error = %e,
                    "Failed to send model ready notification"
                ),
            }
        };

        tokio::spawn(task.in_current_span())
    }
}
