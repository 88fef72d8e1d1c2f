//! # Design
//!
//! - Keep error messages constant; carry program, path and exit context in fields.
//! - Expose a client-facing diagnostic separately from `Display` so handlers
//!   can surface converter stderr without logging it twice.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Result alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors produced while preparing or running a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The converter process could not be started.
    #[error("converter launch failed")]
    Launch {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The converter ran but exited with a non-zero status.
    #[error("converter exited unsuccessfully")]
    Failed {
        /// Program that failed.
        program: PathBuf,
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Captured diagnostic stream.
        stderr: String,
    },
    /// The converter exceeded its time budget and was killed.
    #[error("converter timed out")]
    Timeout {
        /// Program that was killed.
        program: PathBuf,
        /// Budget that was exceeded.
        timeout: Duration,
    },
    /// Filesystem failures around the conversion workspace.
    #[error("conversion io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Human-readable description suitable for returning to the client.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Launch { program, source } => {
                format!("failed to launch {}: {source}", program_name(program))
            }
            Self::Failed {
                program,
                code,
                stderr,
            } => {
                let name = program_name(program);
                if stderr.is_empty() {
                    code.map_or_else(
                        || format!("{name} conversion failed: terminated by signal"),
                        |code| format!("{name} conversion failed: exit status {code}"),
                    )
                } else {
                    format!("{name} conversion failed: {stderr}")
                }
            }
            Self::Timeout { program, timeout } => {
                format!(
                    "{} conversion timed out after {timeout:?}",
                    program_name(program)
                )
            }
            Self::Io {
                operation,
                path,
                source,
            } => format!("{operation} failed for {}: {source}", path.display()),
        }
    }

    /// Whether the failure was the converter running out of time.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn program_name(program: &Path) -> String {
    program.file_name().map_or_else(
        || program.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
