//! Per-route request counting.

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use mdocx_telemetry::Metrics;
use tracing::debug;

use crate::http::constants::HEADER_REQUEST_ID;

/// Count the request under its route template and final status code.
///
/// Templates such as `/download/{conversion_id}` keep per-id paths out of the
/// label set.
pub(crate) async fn record_http_metrics(
    State(telemetry): State<Metrics>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let route = route_label(&request);
    let request_id = request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let response = next.run(request).await;
    let status = response.status().as_u16();
    telemetry.inc_http_request(&route, status);
    debug!(
        request_id = request_id.as_deref().unwrap_or(""),
        route = %route,
        status,
        "request counted"
    );
    response
}

fn route_label(request: &Request<Body>) -> String {
    request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_owned(),
        |matched| matched.as_str().to_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::route_label;
    use axum::body::Body;
    use axum::http::Request;

    #[test]
    fn unmatched_requests_fall_back_to_uri_path() -> anyhow::Result<()> {
        let request = Request::get("/download/abc?x=1").body(Body::empty())?;
        assert_eq!(route_label(&request), "/download/abc");
        Ok(())
    }
}
