//! Worker startup sequence.
//!
//! 1. Validate the handler manifest path
//! 2. Create the handler through the registry
//! 3. Load the model (blocking pool)
//! 4. Bind the loopback listener
//! 5. Spawn the readiness notifier and serve until shutdown
//! 6. Drain in-flight requests for at most the shutdown grace period
//!
//! Any failure before serving is fatal; `main` turns it into exit status 1.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};
use worker_core::{HandlerManifest, HandlerRegistry};

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::notifier::ReadyNotifier;
use crate::server::{self, AppState};

/// A worker whose model is loaded but which is not yet listening.
pub struct Worker {
    config: WorkerConfig,
    state: AppState,
}

impl Worker {
    /// Resolve the handler named by the manifest and load its model.
    pub async fn prepare(
        config: WorkerConfig,
        registry: &HandlerRegistry,
    ) -> Result<Self, WorkerError> {
        if !config.handler_path.is_file() {
            return Err(WorkerError::HandlerFileMissing(config.handler_path));
        }

        let manifest = HandlerManifest::from_path(&config.handler_path)?;
        let mut handler = registry
            .create(&manifest)
            .map_err(WorkerError::HandlerInit)?;

        info!(handler = %handler.name(), model_path = %config.model_path.display(), "Start loading model");

        let model_path = config.model_path.clone();
        let handler = tokio::task::spawn_blocking(move || {
            handler.load_model(&model_path).map(|()| handler)
        })
        .await?
        .map_err(WorkerError::ModelLoad)?;

        info!("Model loaded");

        let state = AppState::new(handler, config.worker_id.clone());
        Ok(Self { config, state })
    }

    /// Bind the listening socket.
    pub async fn bind(self) -> Result<BoundWorker, WorkerError> {
        let addr = self.config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| WorkerError::Bind { addr, source })?;

        let notifier = ReadyNotifier::new(&self.config.notifier, self.config.worker_id.clone())?;

        Ok(BoundWorker {
            listener,
            state: self.state,
            notifier,
            shutdown_grace: self.config.shutdown_grace,
        })
    }
}

/// A loaded worker holding its listening socket.
pub struct BoundWorker {
    listener: TcpListener,
    state: AppState,
    notifier: ReadyNotifier,
    shutdown_grace: Duration,
}

impl BoundWorker {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Notify the coordinator and serve until `signal` resolves.
    ///
    /// After the signal the listener is closed and in-flight requests get
    /// the shutdown grace period to finish. Requests still running after
    /// that are abandoned and this returns `Ok` anyway.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), WorkerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr().map_err(WorkerError::Serve)?;
        let grace = self.shutdown_grace;

        // Detached; its outcome never affects the server.
        let _notifier = self.notifier.spawn();

        let (fired_tx, fired_rx) = oneshot::channel::<()>();
        let signal = async move {
            signal.await;
            let _ = fired_tx.send(());
        };

        info!(%addr, "Worker REST started at http://{addr}");
        let mut server = std::pin::pin!(server::serve(self.listener, self.state, signal));

        tokio::select! {
            result = &mut server => result.map_err(WorkerError::Serve)?,
            Ok(()) = fired_rx => {
                match tokio::time::timeout(grace, &mut server).await {
                    Ok(result) => result.map_err(WorkerError::Serve)?,
                    Err(_) => warn!(
                        grace_secs = grace.as_secs_f64(),
                        "Requests still in flight after shutdown grace period, abandoning them"
                    ),
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> Result<(), WorkerError> {
        self.serve_with_shutdown(shutdown_signal()).await
    }
}

/// Resolves on Ctrl-C (SIGINT).
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Never resolve: without a signal handler we serve until killed.
        std::future::pending::<()>().await;
    }
    info!("Stopping server...");
}

/// Full worker lifecycle with the built-in handlers.
pub async fn run(config: WorkerConfig) -> Result<(), WorkerError> {
    let registry = HandlerRegistry::with_builtins();
    Worker::prepare(config, &registry)
        .await?
        .bind()
        .await?
        .serve()
        .await
}
