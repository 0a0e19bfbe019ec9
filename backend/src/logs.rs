//! Import progress logging.
//!
//! Import batches report their progress through the process-wide
//! [`LOG_BROADCASTER`] and nowhere else. Every entry is emitted once as a
//! `tracing` event and forwarded to live subscribers (the SSE stream at
//! `GET /api/logs`).

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Entries kept for slow subscribers before they start lagging.
const CHANNEL_CAPACITY: usize = 100;

/// Log level for live display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Import source the entry belongs to (file name, feed URL, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    fn with_level(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            source: None,
            timestamp: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Error, message)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all connected SSE clients
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Emit the entry through `tracing` and send it to all subscribers.
    pub fn log(&self, entry: LogEntry) {
        let source = entry.source.as_deref().unwrap_or("-");
        match entry.level {
            LogLevel::Info | LogLevel::Success => {
                tracing::info!(source, "{}", entry.message)
            }
            LogLevel::Warning => tracing::warn!(source, "{}", entry.message),
            LogLevel::Error => tracing::error!(source, "{}", entry.message),
        }

        // no subscribers is fine
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for SSE streaming
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions, tagged with the import source
pub fn log_info(source: &str, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::info(msg).with_source(source));
}

pub fn log_success(source: &str, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::success(msg).with_source(source));
}

pub fn log_warning(source: &str, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::warning(msg).with_source(source));
}

pub fn log_error(source: &str, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::error(msg).with_source(source));
}
