//! Shared fixtures for the model-worker integration tests.

#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use worker_core::{Handler, HandlerError};

use model_worker::config::{NotifierConfig, WorkerConfig};
use model_worker::notifier::ModelReady;

/// Handler whose predictions always fail with a fixed message.
pub struct FailingHandler {
    pub message: String,
    pub loaded: bool,
}

impl Handler for FailingHandler {
    fn name(&self) -> &str {
        "failing"
    }

    fn load_model(&mut self, _path: &Path) -> Result<(), HandlerError> {
        self.loaded = true;
        Ok(())
    }

    fn predict(&mut self, _data: Value) -> Result<Value, HandlerError> {
        Err(HandlerError::Prediction(self.message.clone()))
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Echo handler that panics on `{"panic": true}`.
pub struct PanickingHandler;

impl Handler for PanickingHandler {
    fn name(&self) -> &str {
        "panicking"
    }

    fn load_model(&mut self, _path: &Path) -> Result<(), HandlerError> {
        Ok(())
    }

    fn predict(&mut self, data: Value) -> Result<Value, HandlerError> {
        if data["panic"] == json!(true) {
            panic!("handler exploded");
        }
        Ok(json!({ "predictions": data }))
    }

    fn is_loaded(&self) -> bool {
        true
    }
}

/// Echo handler that blocks its thread for `delay` on every prediction.
pub struct SlowHandler {
    pub delay: Duration,
}

impl Handler for SlowHandler {
    fn name(&self) -> &str {
        "slow"
    }

    fn load_model(&mut self, _path: &Path) -> Result<(), HandlerError> {
        Ok(())
    }

    fn predict(&mut self, data: Value) -> Result<Value, HandlerError> {
        std::thread::sleep(self.delay);
        Ok(json!({ "predictions": data }))
    }

    fn is_loaded(&self) -> bool {
        true
    }
}

/// Write a manifest file into `dir` and return its path.
pub fn write_manifest(dir: &Path, manifest: &Value) -> PathBuf {
    let path = dir.join("handler.json");
    std::fs::write(&path, serde_json::to_vec(manifest).unwrap()).unwrap();
    path
}

/// Manifest for an echo handler that loads instantly.
pub fn instant_echo() -> Value {
    json!({ "handler": "echo", "options": { "load_delay_ms": 0 } })
}

pub type Received = Arc<Mutex<Vec<ModelReady>>>;

/// Coordinator stub recording every `/model-ready` call.
pub async fn start_coordinator() -> (u16, Received) {
    let received: Received = Arc::default();

    let app = Router::new()
        .route(
            "/model-ready",
            post(
                |State(received): State<Received>, Json(body): Json<ModelReady>| async move {
                    received.lock().unwrap().push(body);
                    StatusCode::OK
                },
            ),
        )
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (port, received)
}

/// Config listening on an ephemeral port and notifying `coordinator_port`.
pub fn worker_config(handler_path: PathBuf, coordinator_port: u16) -> WorkerConfig {
    WorkerConfig {
        worker_id: "worker-it".to_string(),
        model_path: PathBuf::from("/models/echo"),
        port: 0,
        handler_path,
        notifier: NotifierConfig {
            coordinator_port,
            delay: Duration::ZERO,
            timeout: Duration::from_secs(5),
        },
        shutdown_grace: Duration::from_millis(200),
    }
}

/// Poll until `received` holds `count` notifications or the deadline passes.
pub async fn wait_for_notifications(received: &Received, count: usize) -> usize {
    for _ in 0..100 {
        let len = received.lock().unwrap().len();
        if len >= count {
            return len;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    received.lock().unwrap().len()
}
