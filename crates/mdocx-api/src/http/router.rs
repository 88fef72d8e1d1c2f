//! Router construction and server host for the API.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{get, post},
};
use mdocx_config::ServerConfig;
use mdocx_convert::Converter;
use mdocx_telemetry::{Metrics, build_sha};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Span, debug, info};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::HEADER_REQUEST_ID;
use crate::http::convert::convert_markdown;
use crate::http::conversions::conversion_status;
use crate::http::download::download_document;
use crate::http::health::{health, metrics};
use crate::http::index::index;
use crate::http::telemetry::record_http_metrics;
use crate::state::ApiState;

/// Axum router wrapper that hosts the conversion API.
pub struct ApiServer {
    router: Router,
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Construct the API server around a converter and a telemetry handle.
    #[must_use]
    pub fn new(config: &ServerConfig, converter: Arc<dyn Converter>, telemetry: Metrics) -> Self {
        let state = Arc::new(ApiState::new(
            converter,
            telemetry.clone(),
            config.retention.ttl,
            config.work_dir.clone(),
        ));
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(mdocx_telemetry::set_request_id_layer())
            .layer(mdocx_telemetry::propagate_request_id_layer())
            .layer(trace_layer)
            .layer(middleware::from_fn_with_state(telemetry, record_http_metrics));

        let router = Self::routes(config.max_upload_bytes)
            .route_layer(layered)
            .with_state(Arc::clone(&state));

        Self { router, state }
    }

    fn routes(max_upload_bytes: usize) -> Router<Arc<ApiState>> {
        Router::new()
            .route("/", get(index))
            .route(
                "/convert",
                post(convert_markdown).layer(DefaultBodyLimit::max(max_upload_bytes)),
            )
            .route("/download/{conversion_id}", get(download_document))
            .route("/conversions/{conversion_id}", get(conversion_status))
            .route("/health", get(health))
            .route("/metrics", get(metrics))
    }

    /// Spawn the background task that evicts expired conversions every `every`.
    ///
    /// The task runs until aborted; eviction removes the entry and its
    /// temporary files together.
    #[must_use]
    pub fn spawn_eviction_task(&self, every: Duration) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = state.conversions.evict_expired(Instant::now());
                if evicted > 0 {
                    info!(
                        evicted,
                        remaining = state.conversions.len(),
                        "evicted expired conversions"
                    );
                    state.refresh_active_gauge();
                } else {
                    debug!("no expired conversions");
                }
            }
        })
    }

    /// Serve the API on the provided address until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the listener fails or the server terminates unexpectedly.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Starting API on {}", addr);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })?;
        info!("API server stopped");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }

    #[cfg(test)]
    pub(crate) const fn state(&self) -> &Arc<ApiState> {
        &self.state
    }
}
