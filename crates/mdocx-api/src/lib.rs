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

//! HTTP surface for Markdown to Word conversion.
//!
//! Layout: `store.rs` (per-conversion state records), `state.rs` (shared
//! handler state), `models.rs` (JSON DTOs), `http/` (router, handlers and
//! middleware), `error.rs` (server bootstrap errors).

pub mod error;
pub mod models;

pub(crate) mod http;
pub(crate) mod state;
pub(crate) mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use models::{ConversionResponse, ConversionState, ConversionStatus, ErrorBody};
