//! HTTP surface modules (router, handlers, middleware).

/// Shared constants, header values and client-facing messages.
pub(crate) mod constants;
/// Conversion upload handler.
pub(crate) mod convert;
/// Conversion status lookups.
pub(crate) mod conversions;
/// Converted document downloads.
pub(crate) mod download;
/// JSON error responses.
pub(crate) mod errors;
/// Health and metrics endpoints.
pub(crate) mod health;
/// Static upload page.
pub(crate) mod index;
/// Router construction and server host.
pub(crate) mod router;
/// Metrics middleware for HTTP requests.
pub(crate) mod telemetry;
