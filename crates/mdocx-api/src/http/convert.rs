//! Markdown upload and conversion.
//!
//! # Design
//! - Validation order: field present, then `.md` filename, then body readable.
//! - Rejected uploads create no record; everything after validation does.
//! - A record always reaches `Completed` or `Error` before the response is built,
//!   including when the client disconnects mid-conversion.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use mdocx_convert::ConversionWorkspace;
use mdocx_telemetry::ConversionOutcome;
use tracing::{info, warn};
use uuid::Uuid;

use crate::http::constants::{
    MARKDOWN_EXTENSION, MSG_CANCELLED, MSG_EMPTY_OUTPUT, MSG_NO_FILE_UPLOADED, MSG_ONLY_MARKDOWN,
    UPLOAD_FIELD,
};
use crate::models::{ConversionResponse, ConversionState};
use crate::state::ApiState;
use crate::store::StartedConversion;

type ConvertReply = (StatusCode, Json<ConversionResponse>);

struct Upload {
    file_name: String,
    bytes: Bytes,
}

struct UploadRejection {
    status: StatusCode,
    message: String,
}

impl UploadRejection {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    fn read_failed(err: &MultipartError) -> Self {
        Self {
            status: err.status(),
            message: format!("Failed to read upload: {}", err.body_text()),
        }
    }
}

/// Marks the record failed if the handler future is dropped before finishing.
struct InFlight {
    state: Arc<ApiState>,
    id: Uuid,
    armed: bool,
}

impl InFlight {
    const fn new(state: Arc<ApiState>, id: Uuid) -> Self {
        Self {
            state,
            id,
            armed: true,
        }
    }

    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.armed {
            warn!(conversion_id = %self.id, "conversion abandoned before completion");
            self.state.conversions.fail(&self.id, MSG_CANCELLED);
        }
    }
}

pub(crate) async fn convert_markdown(
    State(state): State<Arc<ApiState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ConvertReply {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(rejection) => {
            info!(
                status = rejection.status.as_u16(),
                reason = %rejection.message,
                "upload rejected"
            );
            state.telemetry.inc_conversion(ConversionOutcome::Rejected);
            return reply(
                rejection.status,
                None,
                ConversionState::rejected(rejection.message),
            );
        }
    };

    let workspace = match ConversionWorkspace::create(state.work_dir.as_deref()) {
        Ok(workspace) => workspace,
        Err(err) => {
            warn!(
                error = %err,
                detail = %err.diagnostic(),
                "failed to allocate conversion workspace"
            );
            return record_setup_failure(&state, ConversionState::default(), &err.diagnostic());
        }
    };
    if let Err(err) = workspace.write_input(&upload.bytes).await {
        warn!(error = %err, detail = %err.diagnostic(), "failed to write uploaded markdown");
        let paths = ConversionState::processing(
            workspace.input_path().to_path_buf(),
            workspace.output_path().to_path_buf(),
        );
        return record_setup_failure(&state, paths, &err.diagnostic());
    }

    let StartedConversion { id, input, output } = state.conversions.begin(workspace);
    state.refresh_active_gauge();
    let mut in_flight = InFlight::new(Arc::clone(&state), id);
    info!(
        conversion_id = %id,
        file_name = %upload.file_name,
        bytes = upload.bytes.len(),
        "conversion started"
    );

    let started = Instant::now();
    let result = state.converter.convert(&input, &output).await;
    state.telemetry.observe_conversion_latency(started.elapsed());

    let outcome = match result {
        Ok(()) if output_exists(&output).await => Ok(()),
        Ok(()) => Err((ConversionOutcome::Failed, MSG_EMPTY_OUTPUT.to_string())),
        Err(err) => {
            let outcome = if err.is_timeout() {
                ConversionOutcome::TimedOut
            } else {
                ConversionOutcome::Failed
            };
            Err((outcome, err.diagnostic()))
        }
    };
    in_flight.disarm();

    match outcome {
        Ok(()) => match state.conversions.complete(&id) {
            Some(completed) => {
                info!(
                    conversion_id = %id,
                    elapsed_ms = started.elapsed().as_millis(),
                    "conversion completed"
                );
                state.telemetry.inc_conversion(ConversionOutcome::Completed);
                reply(StatusCode::OK, Some(id), completed)
            }
            None => {
                state.telemetry.inc_conversion(ConversionOutcome::Failed);
                reply(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some(id),
                    ConversionState::rejected("Conversion failed: conversion record missing"),
                )
            }
        },
        Err((outcome, message)) => {
            warn!(
                conversion_id = %id,
                outcome = outcome.as_str(),
                detail = %message,
                "conversion failed"
            );
            state.telemetry.inc_conversion(outcome);
            let failed = state
                .conversions
                .fail(&id, message.clone())
                .unwrap_or_else(|| ConversionState::rejected(message));
            reply(StatusCode::INTERNAL_SERVER_ERROR, Some(id), failed)
        }
    }
}

async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, UploadRejection> {
    let Ok(mut multipart) = multipart else {
        return Err(UploadRejection::bad_request(MSG_NO_FILE_UPLOADED));
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadRejection::bad_request(MSG_NO_FILE_UPLOADED)),
            Err(err) => return Err(UploadRejection::read_failed(&err)),
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // Plain form values under the upload name are not files.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if !has_markdown_extension(&file_name) {
            return Err(UploadRejection::bad_request(MSG_ONLY_MARKDOWN));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|err| UploadRejection::read_failed(&err))?;
        return Ok(Upload { file_name, bytes });
    }
}

fn has_markdown_extension(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(MARKDOWN_EXTENSION)
}

async fn output_exists(output: &Path) -> bool {
    tokio::fs::metadata(output)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

fn record_setup_failure(
    state: &ApiState,
    mut record: ConversionState,
    detail: &str,
) -> ConvertReply {
    record.mark_failed(format!("Conversion failed: {detail}"));
    let id = state.conversions.insert_failed(record.clone());
    state.refresh_active_gauge();
    state.telemetry.inc_conversion(ConversionOutcome::Failed);
    reply(StatusCode::INTERNAL_SERVER_ERROR, Some(id), record)
}

fn reply(status: StatusCode, conversion_id: Option<Uuid>, state: ConversionState) -> ConvertReply {
    (
        status,
        Json(ConversionResponse {
            conversion_id,
            state,
        }),
    )
}
