//! Conversion status lookups.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::http::constants::MSG_CONVERSION_NOT_FOUND;
use crate::http::errors::ApiError;
use crate::models::ConversionResponse;
use crate::state::ApiState;

pub(crate) async fn conversion_status(
    State(state): State<Arc<ApiState>>,
    Path(conversion_id): Path<String>,
) -> Result<Json<ConversionResponse>, ApiError> {
    let id = Uuid::parse_str(&conversion_id)
        .map_err(|_| ApiError::not_found(MSG_CONVERSION_NOT_FOUND))?;
    let record = state
        .conversions
        .get(&id)
        .ok_or_else(|| ApiError::not_found(MSG_CONVERSION_NOT_FOUND))?;
    Ok(Json(ConversionResponse {
        conversion_id: Some(id),
        state: record,
    }))
}
