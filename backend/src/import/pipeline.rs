//! Batch import into an [`EmployeeRepository`].
//!
//! Every source format goes through the same loop: read the records, turn each
//! one into an [`Employee`], hand it to [`EmployeeRepository::add`] and collect
//! what happened. A bad record is reported and skipped; only a source that
//! cannot be opened or reached fails the batch, and then nothing is imported.
//!
//! # Example
//!
//! ```rust,no_run
//! use workforce::{EmployeeRepository, ImportPipeline};
//!
//! let mut repository = EmployeeRepository::new();
//! let summary = ImportPipeline::new(&mut repository).import_csv_file("staff.csv");
//!
//! println!("{}", summary);
//! for error in summary.errors() {
//!     println!("  {}", error);
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::feed::{employee_from_feed_item, FeedClient, FeedFallback};
use crate::error::{RecordError, RecordErrorKind, SourceError, SourceResult};
use crate::logs::{log_error, log_info, log_success, log_warning};
use crate::models::{Employee, ImportSummary};
use crate::parser::{
    parse_delimited_bytes, parse_delimited_file, parse_markup_bytes, parse_markup_file, RawRecord,
    DEFAULT_DELIMITER, DEFAULT_RECORD_TAG,
};
use crate::repository::EmployeeRepository;
use crate::validation::employee_from_fields;

/// Options shared by every batch of a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// Delimiter for delimited text. `None` detects it from the header line.
    pub delimiter: Option<char>,

    /// Element name of one record in markup sources
    pub record_tag: String,

    /// Job title and salary for feed employees
    pub fallback: FeedFallback,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: Some(DEFAULT_DELIMITER),
            record_tag: DEFAULT_RECORD_TAG.to_string(),
            fallback: FeedFallback::default(),
        }
    }
}

/// Runs import batches against one repository.
///
/// The pipeline holds the repository mutably for its whole lifetime, so a
/// batch is never interleaved with other writes.
pub struct ImportPipeline<'a> {
    repository: &'a mut EmployeeRepository,
    options: ImportOptions,
}

impl<'a> ImportPipeline<'a> {
    pub fn new(repository: &'a mut EmployeeRepository) -> Self {
        Self::with_options(repository, ImportOptions::default())
    }

    pub fn with_options(repository: &'a mut EmployeeRepository, options: ImportOptions) -> Self {
        Self { repository, options }
    }

    // =========================================================================
    // Delimited text
    // =========================================================================

    /// Import a delimited text file. The first line is a header.
    pub fn import_csv_file<P: AsRef<Path>>(&mut self, path: P) -> ImportSummary {
        let path = path.as_ref();
        let source = path.display().to_string();
        log_info(&source, "Reading delimited file...");

        let parsed = parse_delimited_file(path, self.options.delimiter).map(|parsed| {
            log_success(
                &source,
                format!(
                    "Detected encoding {} and delimiter '{}'",
                    parsed.encoding,
                    format_delimiter(parsed.delimiter)
                ),
            );
            parsed.records
        });
        self.import_raw(&source, parsed)
    }

    /// Import delimited text from memory (e.g. an upload).
    pub fn import_csv_bytes(&mut self, source: &str, bytes: &[u8]) -> ImportSummary {
        let parsed = parse_delimited_bytes(bytes, self.options.delimiter);
        self.import_raw(source, Ok(parsed.records))
    }

    // =========================================================================
    // Structured markup
    // =========================================================================

    /// Import a markup file.
    pub fn import_xml_file<P: AsRef<Path>>(&mut self, path: P) -> ImportSummary {
        let path = path.as_ref();
        let source = path.display().to_string();
        log_info(&source, "Reading markup file...");

        let parsed = parse_markup_file(path, &self.options.record_tag);
        self.import_raw(&source, parsed)
    }

    /// Import a markup document from memory.
    pub fn import_xml_bytes(&mut self, source: &str, bytes: &[u8]) -> ImportSummary {
        let parsed = parse_markup_bytes(bytes, &self.options.record_tag);
        self.import_raw(source, parsed)
    }

    // =========================================================================
    // Remote feed
    // =========================================================================

    /// Fetch the feed and import its elements.
    pub async fn import_feed(&mut self, client: &FeedClient) -> ImportSummary {
        log_info(client.url(), "Fetching remote feed...");
        let fetched = client.fetch().await;
        self.import_fetched(client.url(), fetched)
    }

    /// Import feed elements that were already fetched.
    ///
    /// Lets callers do the network round-trip before taking a write lock.
    pub fn import_fetched(&mut self, source: &str, fetched: SourceResult<Vec<Value>>) -> ImportSummary {
        let items = match fetched {
            Ok(items) => items,
            Err(e) => return batch_failed(source, e),
        };

        let fallback = self.options.fallback;
        self.import_records(
            source,
            items
                .iter()
                .map(|item| employee_from_feed_item(item, &fallback)),
        )
    }

    // =========================================================================
    // Core loop
    // =========================================================================

    fn import_raw(&mut self, source: &str, parsed: SourceResult<Vec<RawRecord>>) -> ImportSummary {
        match parsed {
            Ok(records) => self.import_records(source, records.into_iter().map(employee_from_raw)),
            Err(e) => batch_failed(source, e),
        }
    }

    /// Add every record in order, numbering them from 1.
    pub fn import_records<I>(&mut self, source: &str, records: I) -> ImportSummary
    where
        I: IntoIterator<Item = Result<Employee, RecordErrorKind>>,
    {
        let mut errors = Vec::new();
        let mut imported = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let added = record.and_then(|employee| {
                self.repository
                    .add(employee)
                    .cloned()
                    .map_err(RecordErrorKind::from)
            });

            match added {
                Ok(employee) => imported.push(employee),
                Err(kind) => {
                    let error = RecordError::new(index + 1, kind);
                    log_warning(source, error.to_string());
                    errors.push(error.to_string());
                }
            }
        }

        let summary = ImportSummary::new(errors, imported);
        log_success(source, summary.to_string());
        summary
    }
}

fn employee_from_raw(record: RawRecord) -> Result<Employee, RecordErrorKind> {
    match record {
        RawRecord::Fields(fields) => employee_from_fields(&fields),
        RawRecord::Unreadable(reason) => Err(RecordErrorKind::Unreadable(reason)),
    }
}

fn batch_failed(source: &str, error: SourceError) -> ImportSummary {
    log_error(source, error.to_string());
    ImportSummary::failed(error.to_string())
}

fn format_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
