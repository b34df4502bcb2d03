//! HTTP surface of the worker.
//!
//! Endpoints:
//! - POST /predict - Run the loaded handler on a JSON payload
//!
//! Every other path answers 404. Error bodies are `{"error": "..."}` JSON,
//! except handler failures, which return the handler's message as plain
//! text so the coordinator can relay it unchanged.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};
use worker_core::{Handler, HandlerError};

/// Largest accepted request body
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Handler shared with the request path. The mutex serialises predictions.
pub type SharedHandler = Arc<Mutex<Box<dyn Handler>>>;

/// Application state
#[derive(Clone)]
pub struct AppState {
    handler: SharedHandler,
    // Load state only changes in load_model, which finishes before the
    // state is built.
    model_loaded: bool,
    worker_id: Arc<str>,
}

impl AppState {
    pub fn new(handler: Box<dyn Handler>, worker_id: impl Into<String>) -> Self {
        Self {
            model_loaded: handler.is_loaded(),
            handler: Arc::new(Mutex::new(handler)),
            worker_id: Arc::from(worker_id.into()),
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Decode `body` and run it through the handler on the blocking pool.
    ///
    /// Requests that fail validation never wait for the handler. Requests
    /// that pass queue on the async mutex, and only the one holding it
    /// occupies a blocking thread.
    pub async fn predict(&self, body: Bytes) -> Result<Value, PredictError> {
        if !self.model_loaded {
            return Err(PredictError::NotLoaded);
        }

        let data: Value = serde_json::from_slice(&body).map_err(PredictError::InvalidJson)?;

        let mut handler = Arc::clone(&self.handler).lock_owned().await;

        // A panic drops the guard while unwinding, so the next request gets
        // the handler back.
        tokio::task::spawn_blocking(move || handler.predict(data))
            .await
            .map_err(|e| PredictError::Task(e.to_string()))?
            .map_err(PredictError::Handler)
    }
}

/// Per-request failures, each mapped to an HTTP response.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Invalid endpoint")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The body could not be read, including bodies over the size limit.
    #[error("{}", .0.body_text())]
    Body(BytesRejection),

    #[error("Model not loaded")]
    NotLoaded,

    #[error("Invalid request JSON data")]
    InvalidJson(#[source] serde_json::Error),

    #[error("{0}")]
    Handler(HandlerError),

    #[error("prediction task failed: {0}")]
    Task(String),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Body(rejection) => rejection.status(),
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::NotLoaded | Self::Handler(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            // Raw text, not wrapped in JSON
            Self::Handler(_) | Self::Task(_) => (status, self.to_string()).into_response(),
            _ => (status, Json(json!({ "error": self.to_string() }))).into_response(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn predict_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, PredictError> {
    let body = body.map_err(PredictError::Body).inspect_err(|e| {
        error!(status = %e.status(), error = %e, "Failed to read request body");
    })?;

    debug!(worker_id = %state.worker_id(), body_len = body.len(), "Prediction request");

    let prediction = state.predict(body).await.inspect_err(|e| {
        if let PredictError::InvalidJson(source) = e {
            error!(error = %source, "Invalid request JSON data");
        } else {
            error!(error = %e, "Prediction failed");
        }
    })?;

    Ok(Json(prediction))
}

async fn method_not_allowed() -> PredictError {
    error!("Method not allowed on /predict");
    PredictError::MethodNotAllowed
}

async fn not_found() -> PredictError {
    error!("Invalid endpoint");
    PredictError::NotFound
}

// ============================================================================
// Server
// ============================================================================

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/predict",
            post(predict_handler).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve on `listener` until `shutdown` resolves, then drain in-flight
/// requests.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use worker_core::{EchoHandler, EchoOptions};

    fn echo_state(loaded: bool) -> AppState {
        let mut handler = EchoHandler::with_options(EchoOptions {
            load_delay_ms: 0,
            ..EchoOptions::default()
        });
        if loaded {
            handler.load_model(std::path::Path::new("/models/echo")).unwrap();
        }
        AppState::new(Box::new(handler), "worker-test")
    }

    #[tokio::test]
    async fn test_predict_echo() {
        let state = echo_state(true);
        let out = state.predict(Bytes::from_static(br#"{"a": 1}"#)).await.unwrap();
        assert_eq!(out, json!({ "predictions": { "a": 1 } }));
    }

    #[tokio::test]
    async fn test_not_loaded_checked_before_parse() {
        let state = echo_state(false);
        let err = state.predict(Bytes::from_static(b"not json")).await.unwrap_err();
        assert!(matches!(err, PredictError::NotLoaded));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let state = echo_state(true);
        let err = state.predict(Bytes::from_static(b"{\"a\": ")).await.unwrap_err();
        assert!(matches!(err, PredictError::InvalidJson(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(PredictError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(PredictError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(PredictError::NotLoaded.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            PredictError::Handler(HandlerError::Prediction("boom".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_worker_id() {
        assert_eq!(echo_state(false).worker_id(), "worker-test");
    }
}
