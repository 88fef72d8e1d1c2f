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

//! Markdown to Word conversion through an external command-line converter.
//!
//! Layout: `converter.rs` (the [`Converter`] seam and the process-backed
//! [`PandocConverter`]), `workspace.rs` (scoped temporary files for one
//! conversion), `error.rs` (error types).

pub mod converter;
pub mod error;
pub mod workspace;

pub use converter::{Converter, PandocConverter};
pub use error::{ConvertError, ConvertResult};
pub use workspace::ConversionWorkspace;
