//! Environment-backed configuration loader.
//!
//! # Design
//! - Every setting has a default; the environment only overrides.
//! - Lookups go through an injectable function so tests never mutate the
//!   process environment.
//! - Empty values are treated as unset.

use std::path::PathBuf;

use crate::error::ConfigResult;
use crate::model::ServerConfig;
use crate::validate::{
    parse_bind_addr, parse_log_format, parse_port, parse_positive_secs, parse_positive_usize,
    split_args,
};

const BIND_ADDR: &str = "MDOCX_BIND_ADDR";
const HTTP_PORT: &str = "MDOCX_HTTP_PORT";
const CONVERTER: &str = "MDOCX_CONVERTER";
const CONVERTER_ARGS: &str = "MDOCX_CONVERTER_ARGS";
const CONVERTER_TIMEOUT_SECS: &str = "MDOCX_CONVERTER_TIMEOUT_SECS";
const RETENTION_SECS: &str = "MDOCX_RETENTION_SECS";
const SWEEP_INTERVAL_SECS: &str = "MDOCX_SWEEP_INTERVAL_SECS";
const MAX_UPLOAD_BYTES: &str = "MDOCX_MAX_UPLOAD_BYTES";
const WORK_DIR: &str = "MDOCX_WORK_DIR";
const LOG_LEVEL: &str = "MDOCX_LOG_LEVEL";
const LOG_FORMAT: &str = "MDOCX_LOG_FORMAT";

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns [`crate::ConfigError::InvalidField`] when a variable is present but
/// cannot be parsed.
pub fn load_from_env() -> ConfigResult<ServerConfig> {
    load_from_lookup(|name| std::env::var(name).ok())
}

/// Load configuration using a caller-supplied variable lookup.
///
/// # Errors
///
/// Returns [`crate::ConfigError::InvalidField`] when a variable is present but
/// cannot be parsed.
pub fn load_from_lookup<F>(lookup: F) -> ConfigResult<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
    let mut config = ServerConfig::default();

    if let Some(value) = get(BIND_ADDR) {
        config.bind_addr = parse_bind_addr(BIND_ADDR, &value)?;
    }
    if let Some(value) = get(HTTP_PORT) {
        config.http_port = parse_port(HTTP_PORT, &value)?;
    }
    if let Some(value) = get(CONVERTER) {
        config.converter.program = PathBuf::from(value.trim());
    }
    if let Some(value) = get(CONVERTER_ARGS) {
        config.converter.leading_args = split_args(&value);
    }
    if let Some(value) = get(CONVERTER_TIMEOUT_SECS) {
        config.converter.timeout = parse_positive_secs(CONVERTER_TIMEOUT_SECS, &value)?;
    }
    if let Some(value) = get(RETENTION_SECS) {
        config.retention.ttl = parse_positive_secs(RETENTION_SECS, &value)?;
    }
    if let Some(value) = get(SWEEP_INTERVAL_SECS) {
        config.retention.sweep_interval = parse_positive_secs(SWEEP_INTERVAL_SECS, &value)?;
    }
    if let Some(value) = get(MAX_UPLOAD_BYTES) {
        config.max_upload_bytes = parse_positive_usize(MAX_UPLOAD_BYTES, &value)?;
    }
    if let Some(value) = get(WORK_DIR) {
        config.work_dir = Some(PathBuf::from(value.trim()));
    }
    if let Some(value) = get(LOG_LEVEL) {
        config.logging.level = value.trim().to_string();
    }
    if let Some(value) = get(LOG_FORMAT) {
        config.logging.format = Some(parse_log_format(LOG_FORMAT, &value)?);
    }

    Ok(config)
}
