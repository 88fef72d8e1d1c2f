//! Health and diagnostics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use mdocx_telemetry::{MetricsSnapshot, build_sha};
use serde::Serialize;
use tracing::error;

use crate::http::errors::ApiError;
use crate::state::ApiState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) build: &'static str,
    pub(crate) conversions: usize,
    pub(crate) metrics: MetricsSnapshot,
}

pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        build: build_sha(),
        conversions: state.conversions.len(),
        metrics: state.telemetry.snapshot(),
    })
}

pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{
        FakeConverter, TestServer, get_request, multipart_request, read_bytes, read_json,
        upload_field,
    };
    use anyhow::Result;
    use axum::http::StatusCode;
    use serde_json::Value;

    #[tokio::test]
    async fn health_reports_retained_conversions() -> Result<()> {
        let server = TestServer::new(FakeConverter::copy_input())?;
        server
            .send(multipart_request(&[upload_field("doc.md", b"x")]))
            .await?;

        let response = server.send(get_request("/health")?).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = read_json(response).await?;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["conversions"], 1);
        assert!(body["build"].is_string());
        assert_eq!(body["metrics"]["conversions_completed_total"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn metrics_expose_request_and_conversion_counters() -> Result<()> {
        let server = TestServer::new(FakeConverter::copy_input())?;
        server
            .send(multipart_request(&[upload_field("doc.md", b"x")]))
            .await?;
        server.send(get_request("/health")?).await?;

        let response = server.send(get_request("/metrics")?).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let text = String::from_utf8(read_bytes(response).await?)?;
        assert!(text.contains("conversions_total"), "{text}");
        assert!(text.contains("http_requests_total"), "{text}");
        assert!(text.contains("route=\"/convert\""), "{text}");
        Ok(())
    }
}
