#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives shared across the mdocx workspace.
//!
//! Layout: `init.rs` (subscriber installation), `layers.rs` (request-id
//! middleware), `metrics.rs` (Prometheus registry), `error.rs` (error types).

pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use error::{CollectorStage, Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{propagate_request_id_layer, set_request_id_layer};
pub use metrics::{ConversionOutcome, Metrics, MetricsSnapshot};
