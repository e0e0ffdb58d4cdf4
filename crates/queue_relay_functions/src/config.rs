use queue_relay_core::encoding::MessageEncoding;
use thiserror::Error;

use crate::telemetry::{LogFormat, LOG_FORMAT_ENV};

pub const PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
pub const LOG_QUEUE_ENCODING_ENV: &str = "RELAY_LOG_QUEUE_ENCODING";
pub const BLOB_QUEUE_ENCODING_ENV: &str = "RELAY_BLOB_QUEUE_ENCODING";

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a valid port number, got '{value}'")]
    InvalidPort { key: &'static str, value: String },

    #[error("{key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Start-up settings for the relay host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub port: u16,
    pub log_format: LogFormat,
    pub log_relay_encoding: MessageEncoding,
    pub blob_relay_encoding: MessageEncoding,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_format: LogFormat::Pretty,
            // Bodies are logged as they arrive; base64 decoding is opt-in.
            log_relay_encoding: MessageEncoding::None,
            blob_relay_encoding: MessageEncoding::None,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup(PORT_ENV) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort {
                    key: PORT_ENV,
                    value,
                })?,
            None => defaults.port,
        };

        Ok(Self {
            port,
            log_format: parse_or(&lookup, LOG_FORMAT_ENV, defaults.log_format)?,
            log_relay_encoding: parse_or(
                &lookup,
                LOG_QUEUE_ENCODING_ENV,
                defaults.log_relay_encoding,
            )?,
            blob_relay_encoding: parse_or(
                &lookup,
                BLOB_QUEUE_ENCODING_ENV,
                defaults.blob_relay_encoding,
            )?,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = String>,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|message| ConfigError::InvalidValue { key, message }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| values.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = HostConfig::from_lookup(lookup(&[])).expect("defaults should load");
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_relay_encoding, MessageEncoding::None);
        assert_eq!(config.blob_relay_encoding, MessageEncoding::None);
    }

    #[test]
    fn reads_overrides() {
        let config = HostConfig::from_lookup(lookup(&[
            (PORT_ENV, "7071"),
            (LOG_FORMAT_ENV, "json"),
            (LOG_QUEUE_ENCODING_ENV, "base64"),
            (BLOB_QUEUE_ENCODING_ENV, "base64"),
        ]))
        .expect("overrides should load");

        assert_eq!(config.port, 7071);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_relay_encoding, MessageEncoding::Base64);
        assert_eq!(config.blob_relay_encoding, MessageEncoding::Base64);
    }

    #[test]
    fn rejects_bad_port() {
        let error = HostConfig::from_lookup(lookup(&[(PORT_ENV, "http")]))
            .expect_err("port should be numeric");
        assert_eq!(
            error,
            ConfigError::InvalidPort {
                key: PORT_ENV,
                value: "http".to_string(),
            }
        );
    }

    #[test]
    fn rejects_unknown_encoding() {
        let error = HostConfig::from_lookup(lookup(&[(BLOB_QUEUE_ENCODING_ENV, "gzip")]))
            .expect_err("encoding should be known");
        assert!(error.to_string().starts_with("RELAY_BLOB_QUEUE_ENCODING: "));
    }
}
