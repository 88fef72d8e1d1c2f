//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes only the counters and gauges the conversion service reports.

use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use prometheus::{IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{CollectorStage, Result, TelemetryError};

/// Terminal outcome of a conversion request, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The converter produced a document.
    Completed,
    /// The converter or the surrounding IO failed.
    Failed,
    /// The converter exceeded its time budget.
    TimedOut,
    /// The upload was rejected before conversion started.
    Rejected,
}

impl ConversionOutcome {
    /// Label value recorded for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Rejected => "rejected",
        }
    }
}

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    conversions_total: IntCounterVec,
    conversion_latency_ms: IntGauge,
    active_conversions: IntGauge,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Conversions currently retained by the store.
    pub active_conversions: i64,
    /// Latency (ms) of the most recent converter invocation.
    pub conversion_latency_ms: i64,
    /// Total conversions that completed successfully.
    pub conversions_completed_total: u64,
    /// Total conversions that failed or timed out.
    pub conversions_failed_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )
        .map_err(|source| collector("http_requests_total", source))?;
        let conversions_total = IntCounterVec::new(
            Opts::new("conversions_total", "Conversion requests by outcome"),
            &["outcome"],
        )
        .map_err(|source| collector("conversions_total", source))?;
        let conversion_latency_ms = IntGauge::with_opts(Opts::new(
            "conversion_latency_ms",
            "Duration of the most recent converter invocation (ms)",
        ))
        .map_err(|source| collector("conversion_latency_ms", source))?;
        let active_conversions = IntGauge::with_opts(Opts::new(
            "active_conversions",
            "Conversions currently retained for download",
        ))
        .map_err(|source| collector("active_conversions", source))?;

        registry
            .register(Box::new(http_requests_total.clone()))
            .map_err(|source| register("http_requests_total", source))?;
        registry
            .register(Box::new(conversions_total.clone()))
            .map_err(|source| register("conversions_total", source))?;
        registry
            .register(Box::new(conversion_latency_ms.clone()))
            .map_err(|source| register("conversion_latency_ms", source))?;
        registry
            .register(Box::new(active_conversions.clone()))
            .map_err(|source| register("active_conversions", source))?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                conversions_total,
                conversion_latency_ms,
                active_conversions,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Count a conversion request by its terminal outcome.
    pub fn inc_conversion(&self, outcome: ConversionOutcome) {
        self.inner
            .conversions_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// Record how long the converter took.
    pub fn observe_conversion_latency(&self, duration: Duration) {
        self.inner
            .conversion_latency_ms
            .set(Self::duration_to_ms(duration));
    }

    /// Set the number of conversions retained by the store.
    pub fn set_active_conversions(&self, count: usize) {
        self.inner
            .active_conversions
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Render`] if the gathered families cannot be encoded.
    pub fn render(&self) -> Result<String> {
        let metric_families = self.inner.registry.gather();
        TextEncoder::new()
            .encode_to_string(&metric_families)
            .map_err(|source| TelemetryError::Render { source })
    }

    /// Take a point-in-time snapshot of the conversion gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let count = |outcome: ConversionOutcome| {
            self.inner
                .conversions_total
                .with_label_values(&[outcome.as_str()])
                .get()
        };
        MetricsSnapshot {
            active_conversions: self.inner.active_conversions.get(),
            conversion_latency_ms: self.inner.conversion_latency_ms.get(),
            conversions_completed_total: count(ConversionOutcome::Completed),
            conversions_failed_total: count(ConversionOutcome::Failed)
                + count(ConversionOutcome::TimedOut),
        }
    }

    /// Convert a duration to milliseconds saturating at `i64::MAX`.
    pub(crate) fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}

const fn collector(name: &'static str, source: prometheus::Error) -> TelemetryError {
    TelemetryError::Collector {
        name,
        stage: CollectorStage::Build,
        source,
    }
}

const fn register(name: &'static str, source: prometheus::Error) -> TelemetryError {
    TelemetryError::Collector {
        name,
        stage: CollectorStage::Register,
        source,
    }
}
