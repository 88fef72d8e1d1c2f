//! Parsing helpers for individual environment values.

use std::net::IpAddr;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

pub(crate) fn parse_bind_addr(field: &'static str, value: &str) -> ConfigResult<IpAddr> {
    value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::invalid(field, "not_an_ip_address", value))
}

pub(crate) fn parse_port(field: &'static str, value: &str) -> ConfigResult<u16> {
    let port = value
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::invalid(field, "not_a_port", value))?;
    if port == 0 {
        return Err(ConfigError::invalid(field, "zero", value));
    }
    Ok(port)
}

pub(crate) fn parse_positive_secs(field: &'static str, value: &str) -> ConfigResult<Duration> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(field, "not_a_number", value))?;
    if secs == 0 {
        return Err(ConfigError::invalid(field, "zero", value));
    }
    Ok(Duration::from_secs(secs))
}

pub(crate) fn parse_positive_usize(field: &'static str, value: &str) -> ConfigResult<usize> {
    let parsed = value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::invalid(field, "not_a_number", value))?;
    if parsed == 0 {
        return Err(ConfigError::invalid(field, "zero", value));
    }
    Ok(parsed)
}

pub(crate) fn parse_log_format(field: &'static str, value: &str) -> ConfigResult<String> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "json" | "pretty" => Ok(normalized),
        _ => Err(ConfigError::invalid(field, "unknown_log_format", value)),
    }
}

pub(crate) fn split_args(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_rejects_zero_and_garbage() {
        assert_eq!(parse_port("PORT", " 8080 ").ok(), Some(8080));
        assert!(matches!(
            parse_port("PORT", "0"),
            Err(ConfigError::InvalidField { reason: "zero", .. })
        ));
        assert!(matches!(
            parse_port("PORT", "70000"),
            Err(ConfigError::InvalidField {
                reason: "not_a_port",
                ..
            })
        ));
    }

    #[test]
    fn durations_must_be_positive() {
        assert_eq!(
            parse_positive_secs("TTL", "30").ok(),
            Some(Duration::from_secs(30))
        );
        assert!(parse_positive_secs("TTL", "0").is_err());
        assert!(parse_positive_secs("TTL", "-1").is_err());
    }

    #[test]
    fn log_format_is_normalized() {
        assert_eq!(parse_log_format("FMT", "JSON").ok().as_deref(), Some("json"));
        assert!(parse_log_format("FMT", "xml").is_err());
    }

    #[test]
    fn args_split_on_whitespace() {
        assert_eq!(split_args("  -c  'x' "), vec!["-c", "'x'"]);
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn bind_addr_accepts_v4_and_v6() {
        assert!(parse_bind_addr("ADDR", "127.0.0.1").is_ok());
        assert!(parse_bind_addr("ADDR", "::1").is_ok());
        assert!(parse_bind_addr("ADDR", "localhost").is_err());
    }
}
