//! # Workforce - employee directory with bulk import
//!
//! Workforce keeps an in-memory directory of employees for one or more
//! companies, ingests bulk updates from delimited text, XML documents and a
//! remote JSON feed, and computes per-company statistics.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV / XML / │────▶│   Parser    │────▶│ Validation  │────▶│ Repository  │
//! │    Feed     │     │ (auto-enc)  │     │ (per record)│     │ (unique IDs)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                      ImportSummary ◀── per-record errors           ▼
//!                                                             StatisticsAggregator
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use workforce::{EmployeeRepository, ImportPipeline, StatisticsAggregator};
//!
//! let mut repository = EmployeeRepository::new();
//! let summary = ImportPipeline::new(&mut repository).import_csv_file("staff.csv");
//! println!("{}", summary);
//!
//! for (company, stats) in StatisticsAggregator::from_repository(&repository).per_company() {
//!     println!("{}: {}", company, stats);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (Employee, JobTitle, EmploymentStatus, ...)
//! - [`registry`] - Case-insensitive email registry
//! - [`repository`] - In-memory employee repository
//! - [`stats`] - Per-company aggregations
//! - [`parser`] - Delimited text and markup parsing with encoding detection
//! - [`validation`] - Field validation and feed schema checks
//! - [`import`] - Import pipeline and remote feed client
//! - [`config`] - Environment configuration
//! - [`logs`] - Import progress log broadcaster
//! - [`telemetry`] - Log subscriber setup
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Storage
pub mod registry;
pub mod repository;

// Statistics
pub mod stats;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Import
pub mod import;

// Runtime
pub mod config;
pub mod logs;
pub mod telemetry;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, RecordError, RecordErrorKind, ServerError, SourceError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CompanyStatistics, Employee, EmployeePatch, EmploymentStatus, ImportSummary, JobTitle,
};

// =============================================================================
// Re-exports - Repository & Statistics
// =============================================================================

pub use registry::EmailRegistry;
pub use repository::EmployeeRepository;
pub use stats::StatisticsAggregator;

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_delimited, parse_delimited_bytes,
    parse_delimited_file, parse_markup, parse_markup_bytes, parse_markup_file, ParseResult,
    RawRecord,
};

// =============================================================================
// Re-exports - Import
// =============================================================================

pub use import::{FeedClient, FeedFallback, ImportOptions, ImportPipeline};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::AppConfig;

// Server
pub mod server {
    pub use crate::api::server::{create_router, start_server, AppState};
}
