//! Default values applied when an environment variable is absent.
//!
//! # Design
//! - Defaults reproduce a stock deployment: every interface, port 5000 and
//!   `pandoc` resolved from `PATH`.

use std::net::{IpAddr, Ipv4Addr};

/// Listen address used when `MDOCX_BIND_ADDR` is unset.
pub const BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Listen port used when `MDOCX_HTTP_PORT` is unset.
pub const HTTP_PORT: u16 = 5000;
/// Converter executable used when `MDOCX_CONVERTER` is unset.
pub const CONVERTER_PROGRAM: &str = "pandoc";
/// Converter time budget in seconds.
pub const CONVERTER_TIMEOUT_SECS: u64 = 120;
/// How long an untouched conversion is retained, in seconds.
pub const RETENTION_SECS: u64 = 900;
/// Period of the eviction sweep, in seconds.
pub const SWEEP_INTERVAL_SECS: u64 = 60;
/// Maximum accepted upload body size.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Log level used when neither `RUST_LOG` nor `MDOCX_LOG_LEVEL` is set.
pub const LOG_LEVEL: &str = "info";
