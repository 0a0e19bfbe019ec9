//! Error types for the employee directory.
//!
//! This module defines the error hierarchy used across the crate:
//!
//! - [`ValidationError`] - A single record or field failed validation
//! - [`RecordError`] - A validation failure tagged with its position in a batch
//! - [`SourceError`] - An import source could not be opened or reached
//! - [`ConfigError`] - Invalid environment configuration
//! - [`ServerError`] - HTTP layer errors
//!
//! Lookups that miss are not errors: they return `None`.

use thiserror::Error;

// =============================================================================
// Validation Errors
// =============================================================================

/// A record (or one of its fields) was rejected.
///
/// Every variant carries a stable reason code through [`ValidationError::code`],
/// so callers can branch on the kind of failure without parsing messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },

    /// Another record already uses this email (case-insensitive).
    #[error("email '{0}' already exists")]
    DuplicateEmail(String),

    /// Salary text is not a number.
    #[error("invalid salary '{0}'")]
    InvalidSalary(String),

    /// Salary is below zero or not finite.
    #[error("salary must be a non-negative number, got {0}")]
    NegativeSalary(f64),

    /// Job title does not match any known title.
    #[error("unknown job title '{0}'")]
    UnknownJobTitle(String),
}

impl ValidationError {
    /// Machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlankField { .. } => "blank_field",
            Self::DuplicateEmail(_) => "duplicate_email",
            Self::InvalidSalary(_) => "invalid_salary",
            Self::NegativeSalary(_) => "negative_salary",
            Self::UnknownJobTitle(_) => "unknown_job_title",
        }
    }
}

// =============================================================================
// Record Errors (inside a batch)
// =============================================================================

/// Why a single record of a batch was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordErrorKind {
    /// The record does not carry exactly the expected number of fields.
    #[error("wrong field count ({0})")]
    WrongFieldCount(usize),

    /// One of the fields failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The record could not be read at all (bad encoding, broken quoting, ...).
    #[error("unreadable record: {0}")]
    Unreadable(String),

    /// A feed element does not have the expected shape.
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// A rejected record together with its 1-based position in the batch.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("record {record}: {kind}")]
pub struct RecordError {
    pub record: usize,
    pub kind: RecordErrorKind,
}

impl RecordError {
    pub fn new(record: usize, kind: impl Into<RecordErrorKind>) -> Self {
        Self {
            record,
            kind: kind.into(),
        }
    }
}

// =============================================================================
// Source Errors (whole batch)
// =============================================================================

/// The import source could not be opened, read or reached.
///
/// This is the only failure that ends a batch before any record is processed.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File does not exist.
    #[error("source not found: {0}")]
    NotFound(String),

    /// File exists but could not be read.
    #[error("cannot read source '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote feed answered with a non-success status.
    #[error("feed returned HTTP {0}")]
    Http(u16),

    /// Remote feed could not be reached.
    #[error("feed request failed: {0}")]
    Transport(String),

    /// Remote feed did not answer in time.
    #[error("feed request timed out after {0} seconds")]
    Timeout(u64),

    /// Payload is not the expected document shape (e.g. not a JSON array).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Markup document is not well-formed.
    #[error("malformed markup: {0}")]
    Markup(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },

    /// The log filter does not parse.
    #[error("invalid log filter '{value}': {message}")]
    LogFilter { value: String, message: String },

    /// A global log subscriber is already installed.
    #[error("cannot install log subscriber: {0}")]
    Subscriber(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Request body or parameters are invalid.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A record was rejected by the repository.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No employee with the given email.
    #[error("Employee not found: {0}")]
    NotFound(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for repository mutations and field parsing.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for opening import sources.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
