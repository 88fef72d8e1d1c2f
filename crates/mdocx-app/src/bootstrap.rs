use std::future::Future;
use std::sync::Arc;

use mdocx_api::ApiServer;
use mdocx_config::{ConverterSettings, LoggingSettings, ServerConfig};
use mdocx_convert::{Converter, PandocConverter};
use mdocx_telemetry::{LogFormat, LoggingConfig, Metrics};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Entry point for the mdocx boot sequence.
///
/// Loads configuration from the environment, installs logging and serves the
/// API until Ctrl-C is received.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be installed
/// or the API listener fails.
pub async fn run_app() -> AppResult<()> {
    let config =
        mdocx_config::load_from_env().map_err(|err| AppError::config("config.load_from_env", err))?;
    mdocx_telemetry::init_logging(&logging_config(&config.logging))
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    info!(
        addr = %config.socket_addr(),
        converter = %config.converter.program.display(),
        timeout_secs = config.converter.timeout.as_secs(),
        retention_secs = config.retention.ttl.as_secs(),
        "mdocx bootstrap starting"
    );

    let telemetry = Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
    let converter: Arc<dyn Converter> = Arc::new(build_converter(&config.converter));
    serve_until(&config, converter, telemetry, shutdown_signal()).await
}

/// Serve the API with injected dependencies until `shutdown` resolves.
pub(crate) async fn serve_until<F>(
    config: &ServerConfig,
    converter: Arc<dyn Converter>,
    telemetry: Metrics,
    shutdown: F,
) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let api = ApiServer::new(config, converter, telemetry);
    let sweeper = api.spawn_eviction_task(config.retention.sweep_interval);

    let addr = config.socket_addr();
    info!(addr = %addr, "Launching API listener");
    let serve_result = api.serve(addr, shutdown).await;

    if !sweeper.is_finished() {
        sweeper.abort();
    }
    if let Err(err) = sweeper.await
        && !err.is_cancelled()
    {
        warn!(error = %err, "eviction task join failed");
    }

    serve_result.map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("API server shutdown complete");
    Ok(())
}

fn logging_config(settings: &LoggingSettings) -> LoggingConfig<'_> {
    LoggingConfig {
        level: &settings.level,
        format: LogFormat::from_name(settings.format.as_deref()),
        ..LoggingConfig::default()
    }
}

fn build_converter(settings: &ConverterSettings) -> PandocConverter {
    PandocConverter::new(settings.program.clone(), settings.timeout)
        .with_leading_args(settings.leading_args.iter().cloned())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            // Without a signal handler the server runs until the process is killed.
            warn!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
