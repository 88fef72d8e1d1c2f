//! JSON DTOs for the conversion API.
//!
//! Conversion responses are the state record flattened next to the
//! `conversion_id` the client needs for later download and status requests.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a single conversion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    /// Nothing has been submitted.
    #[default]
    Idle,
    /// The converter is running.
    Processing,
    /// The output document is available for download.
    Completed,
    /// The conversion failed; `error` explains why.
    Error,
}

/// State record of one conversion attempt.
///
/// `status == Error` implies a non-empty `error`; `status == Completed`
/// implies `output_path` names the produced document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversionState {
    /// Current lifecycle status.
    pub status: ConversionStatus,
    /// Failure description, present only for `Error`.
    pub error: Option<String>,
    /// Temporary path holding the uploaded Markdown.
    pub input_path: Option<PathBuf>,
    /// Temporary path the Word document is written to.
    pub output_path: Option<PathBuf>,
}

const FALLBACK_ERROR: &str = "Conversion failed";

impl ConversionState {
    /// Failed state for a request rejected before any file was written.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        let mut state = Self::default();
        state.mark_failed(message);
        state
    }

    /// Fresh state for a conversion whose input has been written.
    #[must_use]
    pub const fn processing(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            status: ConversionStatus::Processing,
            error: None,
            input_path: Some(input_path),
            output_path: Some(output_path),
        }
    }

    /// Transition to `Completed`, clearing any error.
    pub fn mark_completed(&mut self) {
        self.status = ConversionStatus::Completed;
        self.error = None;
    }

    /// Transition to `Error`; an empty message is replaced so the error is never blank.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.status = ConversionStatus::Error;
        self.error = Some(if message.trim().is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            message
        });
    }

    /// Whether the conversion has reached `Completed` or `Error`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ConversionStatus::Completed | ConversionStatus::Error
        )
    }
}

/// Body returned by `POST /convert` and `GET /conversions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversionResponse {
    /// Identifier to pass to the download route; absent for rejected uploads.
    pub conversion_id: Option<Uuid>,
    /// State record of the conversion.
    #[serde(flatten)]
    pub state: ConversionState,
}

/// Error payload used by the download and status routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human-readable error description.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_state_is_idle() {
        let state = ConversionState::default();
        assert_eq!(state.status, ConversionStatus::Idle);
        assert!(!state.is_terminal());
    }

    #[test]
    fn rejected_state_serializes_like_the_upload_contract() -> serde_json::Result<()> {
        let response = ConversionResponse {
            conversion_id: None,
            state: ConversionState::rejected("No file uploaded"),
        };
        let value = serde_json::to_value(&response)?;
        assert_eq!(
            value,
            json!({
                "conversion_id": null,
                "status": "error",
                "error": "No file uploaded",
                "input_path": null,
                "output_path": null,
            })
        );
        Ok(())
    }

    #[test]
    fn failure_message_is_never_blank() {
        let mut state = ConversionState::processing("in.md".into(), "out.docx".into());
        state.mark_failed("   ");
        assert_eq!(state.status, ConversionStatus::Error);
        assert_eq!(state.error.as_deref(), Some(FALLBACK_ERROR));
        assert!(state.is_terminal());
    }

    #[test]
    fn completion_clears_error_and_keeps_paths() {
        let mut state = ConversionState::processing("in.md".into(), "out.docx".into());
        state.mark_completed();
        assert_eq!(state.status, ConversionStatus::Completed);
        assert!(state.error.is_none());
        assert_eq!(state.output_path, Some(PathBuf::from("out.docx")));
    }

    #[test]
    fn response_round_trips_through_flattened_json() -> serde_json::Result<()> {
        let id = Uuid::new_v4();
        let body = json!({
            "conversion_id": id,
            "status": "completed",
            "error": null,
            "input_path": "/tmp/a/input.md",
            "output_path": "/tmp/a/output.docx",
        });
        let parsed: ConversionResponse = serde_json::from_value(body)?;
        assert_eq!(parsed.conversion_id, Some(id));
        assert_eq!(parsed.state.status, ConversionStatus::Completed);
        Ok(())
    }
}
