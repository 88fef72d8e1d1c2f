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

//! Environment-driven configuration for the mdocx server.
//!
//! Layout: `model.rs` (typed settings), `loader.rs` (environment lookup),
//! `validate.rs` (parsing helpers), `defaults.rs` (fallback values).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_from_env, load_from_lookup};
pub use model::{ConverterSettings, LoggingSettings, RetentionSettings, ServerConfig};
