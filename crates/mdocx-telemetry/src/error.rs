//! Error types for telemetry setup and metrics rendering.
//!
//! Messages stay constant; the failing collector, setup stage and log format
//! travel in fields.

use prometheus::Error as PrometheusError;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

use crate::init::LogFormat;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Step of collector setup that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStage {
    /// Constructing the collector from its options.
    Build,
    /// Adding the collector to the registry.
    Register,
}

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global tracing subscriber was already installed.
    #[error("tracing subscriber installation failed")]
    LoggingInstall {
        /// Format the rejected subscriber would have used.
        format: LogFormat,
        /// Underlying tracing subscriber error.
        source: TryInitError,
    },
    /// A Prometheus collector could not be built or registered.
    #[error("metrics collector setup failed")]
    Collector {
        /// Metric name of the collector.
        name: &'static str,
        /// Setup step that failed.
        stage: CollectorStage,
        /// Underlying Prometheus error.
        source: PrometheusError,
    },
    /// Encoding the registry as Prometheus text failed.
    #[error("metrics rendering failed")]
    Render {
        /// Underlying Prometheus error.
        source: PrometheusError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn collector_failures_keep_name_and_stage_out_of_message() {
        for stage in [CollectorStage::Build, CollectorStage::Register] {
            let err = TelemetryError::Collector {
                name: "conversions_total",
                stage,
                source: PrometheusError::AlreadyReg,
            };
            assert_eq!(err.to_string(), "metrics collector setup failed");
            assert!(err.source().is_some());
            assert!(format!("{err:?}").contains("conversions_total"));
        }
    }

    #[test]
    fn render_failure_exposes_source() {
        let err = TelemetryError::Render {
            source: PrometheusError::Msg("bad family".to_string()),
        };
        assert_eq!(err.to_string(), "metrics rendering failed");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("bad family")
        );
    }
}
