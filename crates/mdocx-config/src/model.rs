//! Typed configuration models.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::defaults;

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    /// Interface the HTTP listener binds to.
    pub bind_addr: IpAddr,
    /// Port the HTTP listener binds to.
    pub http_port: u16,
    /// External converter invocation settings.
    pub converter: ConverterSettings,
    /// Retention of finished conversions.
    pub retention: RetentionSettings,
    /// Upper bound on the upload request body.
    pub max_upload_bytes: usize,
    /// Directory under which conversion workspaces are created; system temp when unset.
    pub work_dir: Option<PathBuf>,
    /// Logging preferences handed to the telemetry crate.
    pub logging: LoggingSettings,
}

impl ServerConfig {
    /// Socket address the API listener should bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: defaults::BIND_ADDR,
            http_port: defaults::HTTP_PORT,
            converter: ConverterSettings::default(),
            retention: RetentionSettings::default(),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            work_dir: None,
            logging: LoggingSettings::default(),
        }
    }
}

/// How the external converter is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConverterSettings {
    /// Executable name or path.
    pub program: PathBuf,
    /// Arguments placed before the input path (wrapper scripts, filters).
    pub leading_args: Vec<String>,
    /// Maximum time a single invocation may run.
    pub timeout: Duration,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from(defaults::CONVERTER_PROGRAM),
            leading_args: Vec::new(),
            timeout: Duration::from_secs(defaults::CONVERTER_TIMEOUT_SECS),
        }
    }
}

/// Eviction policy for finished conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetentionSettings {
    /// Idle time after which a finished conversion is dropped.
    pub ttl: Duration,
    /// How often the eviction sweep runs.
    pub sweep_interval: Duration,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(defaults::RETENTION_SECS),
            sweep_interval: Duration::from_secs(defaults::SWEEP_INTERVAL_SECS),
        }
    }
}

/// Logging preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Requested output format (`json` or `pretty`); inferred from the build when unset.
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: None,
        }
    }
}
