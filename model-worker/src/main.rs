use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, info_span, Instrument};

use model_worker::bootstrap;
use model_worker::config::{shutdown_grace_from_env, Cli, NotifierConfig, WorkerConfig};

const SERVICE_NAME: &str = "model_worker";

fn main() -> ExitCode {
    let cli = Cli::parse();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        worker_core::init_tracing_json(SERVICE_NAME);
    } else {
        worker_core::init_tracing(SERVICE_NAME);
    }

    let config = WorkerConfig::from_cli(cli, NotifierConfig::from_env(), shutdown_grace_from_env());
    let span = info_span!("worker", worker_id = %config.worker_id);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(
        async move {
            info!(port = config.port, "Starting worker");

            match bootstrap::run(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = %e, "Worker failed");
                    ExitCode::from(e.exit_code())
                }
            }
        }
        .instrument(span),
    );

    // A handler stuck in predict must not keep the process alive.
    runtime.shutdown_background();
    code
}
