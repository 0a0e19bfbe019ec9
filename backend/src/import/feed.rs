//! Remote employee feed over HTTP.
//!
//! The feed is a JSON array of objects shaped like
//! `{"name": "Leanne Graham", "email": "...", "company": {"name": "..."}}`.
//! Extra keys are ignored. Feed elements carry no job title or salary; both
//! come from a [`FeedFallback`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{RecordErrorKind, SourceError, SourceResult};
use crate::models::{Employee, JobTitle};
use crate::validation::validate_feed_item;

/// Default request timeout
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Job title and salary given to every feed employee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedFallback {
    pub job_title: JobTitle,
    pub salary: f64,
}

impl Default for FeedFallback {
    fn default() -> Self {
        Self {
            job_title: JobTitle::Developer,
            salary: JobTitle::Developer.base_salary(),
        }
    }
}

/// HTTP client for the remote feed
#[derive(Debug, Clone)]
pub struct FeedClient {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_FEED_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET the feed and return its elements.
    ///
    /// A non-2xx answer, a transport failure, an expired timeout or a body
    /// that is not a JSON array fails the whole fetch.
    pub async fn fetch(&self) -> SourceResult<Vec<Value>> {
        debug!(url = %self.url, timeout = ?self.timeout, "fetching feed");

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(bytes = body.len(), "feed received");

        parse_feed_body(&body)
    }

    fn transport_error(&self, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            SourceError::Timeout(self.timeout.as_secs())
        } else {
            SourceError::Transport(error.to_string())
        }
    }
}

/// Parse a feed body into its elements. Anything but a JSON array is rejected.
pub fn parse_feed_body(body: &str) -> SourceResult<Vec<Value>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| SourceError::InvalidPayload(e.to_string()))?;

    match value {
        Value::Array(items) => Ok(items),
        other => Err(SourceError::InvalidPayload(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

/// Split a full name on its first whitespace run: `"Mary Ann Smith"` is
/// `("Mary", "Ann Smith")`. A single word leaves the last name empty.
pub fn split_name(name: &str) -> (String, String) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

/// Map one feed element to an employee.
pub fn employee_from_feed_item(item: &Value, fallback: &FeedFallback) -> Result<Employee, RecordErrorKind> {
    validate_feed_item(item).map_err(|errors| RecordErrorKind::Malformed(errors.join("; ")))?;

    let text = |value: &Value| value.as_str().unwrap_or_default().trim().to_string();
    let (first_name, last_name) = split_name(&text(&item["name"]));

    Ok(Employee::new(
        first_name,
        last_name,
        text(&item["email"]),
        text(&item["company"]["name"]),
        fallback.job_title.display_name(),
        fallback.salary,
    ))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
