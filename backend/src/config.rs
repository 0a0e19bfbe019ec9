//! Environment configuration.
//!
//! Values are read from the process environment after loading an optional
//! `.env` file. Unset variables take their defaults; set but unparsable ones
//! are errors.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::import::{FeedClient, FeedFallback, ImportOptions, DEFAULT_FEED_TIMEOUT};
use crate::models::JobTitle;
use crate::parser::{DEFAULT_DELIMITER, DEFAULT_RECORD_TAG};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Top-level configuration for the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    /// Delimited file imported at startup
    pub csv_file: Option<PathBuf>,
    /// Markup file imported at startup
    pub xml_file: Option<PathBuf>,
    pub feed_url: Option<String>,
    pub feed_timeout: Duration,
    pub import: ImportOptions,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            csv_file: None,
            xml_file: None,
            feed_url: None,
            feed_timeout: DEFAULT_FEED_TIMEOUT,
            import: ImportOptions::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read the `WORKFORCE_*` variables.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("WORKFORCE_PORT") {
            Some(value) => value.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "WORKFORCE_PORT",
                message: e.to_string(),
                value,
            })?,
            None => defaults.port,
        };

        let feed_timeout = match get("WORKFORCE_FEED_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                Ok(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: "WORKFORCE_FEED_TIMEOUT_SECS",
                        value,
                        message: "must be at least 1".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        key: "WORKFORCE_FEED_TIMEOUT_SECS",
                        message: e.to_string(),
                        value,
                    })
                }
            },
            None => defaults.feed_timeout,
        };

        let mut fallback = FeedFallback::default();
        if let Some(value) = get("WORKFORCE_FEED_JOB_TITLE") {
            fallback.job_title =
                JobTitle::from_display_name(&value).ok_or_else(|| ConfigError::InvalidValue {
                    key: "WORKFORCE_FEED_JOB_TITLE",
                    value: value.clone(),
                    message: "unknown job title".to_string(),
                })?;
        }
        if let Some(value) = get("WORKFORCE_FEED_SALARY") {
            fallback.salary = match value.parse::<f64>() {
                Ok(salary) if salary.is_finite() && salary >= 0.0 => salary,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "WORKFORCE_FEED_SALARY",
                        value,
                        message: "must be a non-negative number".to_string(),
                    })
                }
            };
        }

        let delimiter = match get("WORKFORCE_CSV_DELIMITER") {
            None => Some(DEFAULT_DELIMITER),
            Some(value) => parse_delimiter("WORKFORCE_CSV_DELIMITER", &value)?,
        };

        let log_filter = get("WORKFORCE_LOG")
            .or_else(|| get("RUST_LOG"))
            .unwrap_or(defaults.log_filter);

        Ok(Self {
            port,
            csv_file: get("WORKFORCE_CSV_FILE").map(PathBuf::from),
            xml_file: get("WORKFORCE_XML_FILE").map(PathBuf::from),
            feed_url: get("WORKFORCE_FEED_URL"),
            feed_timeout,
            import: ImportOptions {
                delimiter,
                record_tag: get("WORKFORCE_XML_RECORD_TAG")
                    .unwrap_or_else(|| DEFAULT_RECORD_TAG.to_string()),
                fallback,
            },
            log_filter,
        })
    }

    /// Feed client for the configured URL, if any.
    pub fn feed_client(&self) -> Option<FeedClient> {
        self.feed_url
            .as_ref()
            .map(|url| FeedClient::new(url.clone()).with_timeout(self.feed_timeout))
    }
}

/// Parse a delimiter setting: one ASCII character, `\t` or `tab` for a tab,
/// or `auto` (any case) to detect it from the header line.
pub fn parse_delimiter(key: &'static str, value: &str) -> ConfigResult<Option<char>> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    if value == "\\t" || value.eq_ignore_ascii_case("tab") {
        return Ok(Some('\t'));
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(Some(c)),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            message: "expected one ASCII character, 'tab' or 'auto'".to_string(),
        }),
    }
}
