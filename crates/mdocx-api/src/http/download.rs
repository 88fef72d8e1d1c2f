//! Converted document downloads.

use std::io;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::Response,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::http::constants::{DOCX_CONTENT_TYPE, DOWNLOAD_DISPOSITION, MSG_NO_COMPLETED_CONVERSION};
use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Serve the output of a completed conversion as an attachment.
///
/// The file is left in place so repeated downloads return the same bytes
/// until the entry expires.
pub(crate) async fn download_document(
    State(state): State<Arc<ApiState>>,
    Path(conversion_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = Uuid::parse_str(&conversion_id)
        .map_err(|_| ApiError::not_found(MSG_NO_COMPLETED_CONVERSION))?;
    let output = state
        .conversions
        .completed_output(&id)
        .ok_or_else(|| ApiError::not_found(MSG_NO_COMPLETED_CONVERSION))?;

    let bytes = tokio::fs::read(&output)
        .await
        .map_err(|err| read_failure(&state, &id, &err))?;
    info!(conversion_id = %id, bytes = bytes.len(), "serving converted document");

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, DOCX_CONTENT_TYPE)
        .header(CONTENT_DISPOSITION, DOWNLOAD_DISPOSITION)
        .body(Body::from(bytes))
        .map_err(|err| {
            error!(error = %err, "failed to build download response");
            ApiError::internal(format!("Download failed: {err}"))
        })
}

/// An entry evicted while its file was being read counts as gone, not as a server error.
fn read_failure(state: &ApiState, id: &Uuid, err: &io::Error) -> ApiError {
    if state.conversions.completed_output(id).is_none() {
        info!(conversion_id = %id, "conversion evicted during download");
        return ApiError::not_found(MSG_NO_COMPLETED_CONVERSION);
    }
    error!(conversion_id = %id, error = %err, "failed to read converted document");
    ApiError::internal(format!("Download failed: {err}"))
}
