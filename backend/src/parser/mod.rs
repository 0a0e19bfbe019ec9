//! Source parsing: raw bytes to raw records.
//!
//! Handles encoding detection, delimiter detection and record splitting. No
//! validation happens here: a [`RawRecord`] is just the field texts of one
//! record (or the reason it could not be read). Header lines and fully blank
//! records never become raw records.

pub mod markup;

pub use markup::{parse_markup, parse_markup_bytes, parse_markup_file, DEFAULT_RECORD_TAG};

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{SourceError, SourceResult};

/// Delimiter used when none is given and detection finds nothing better.
pub const DEFAULT_DELIMITER: char = ',';

/// One record as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// Field texts, trimmed, in source order.
    Fields(Vec<String>),
    /// The record could not be decoded.
    Unreadable(String),
}

impl RawRecord {
    fn from_fields(fields: Vec<String>) -> Option<Self> {
        if fields.iter().all(|f| f.trim().is_empty()) {
            None
        } else {
            Some(Self::Fields(fields))
        }
    }
}

/// Result of parsing delimited text, with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Data records (header and blank records removed)
    pub records: Vec<RawRecord>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers from the first line
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-2" | "latin-2" | "latin2" => "iso-8859-2".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the specified encoding.
///
/// Other WHATWG labels are looked up in `encoding_rs`; unknown ones fall back
/// to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        // Windows-1252 agrees with Latin-1 on 0xA0-0xFF
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "iso-8859-2" | "latin-2" | "latin2" => encoding_rs::ISO_8859_2.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(encoding) => encoding.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    }
}

/// Decode bytes after detecting their encoding. Returns `(content, encoding)`.
pub fn decode_auto(bytes: &[u8]) -> (String, String) {
    let encoding = if std::str::from_utf8(bytes).is_ok() {
        "utf-8".to_string()
    } else {
        // invalid UTF-8 cannot be UTF-8, whatever the detector says
        match detect_encoding(bytes).as_str() {
            "utf-8" => "windows-1252".to_string(),
            other => other.to_string(),
        }
    };
    (decode_content(bytes, &encoding), encoding)
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = DEFAULT_DELIMITER;
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Split delimited text into records, one per line.
///
/// The first line is the header. Quoted fields may contain the delimiter but
/// not a line break, so a quote left open only spoils its own line, which
/// comes back as [`RawRecord::Unreadable`]. Records may have any number of
/// fields; arity is checked later.
pub fn parse_delimited(content: &str, delimiter: char) -> ParseResult {
    let delimiter = if delimiter.is_ascii() { delimiter } else { DEFAULT_DELIMITER };
    let mut lines = content.lines();

    let headers = lines
        .next()
        .and_then(|line| split_line(line, delimiter).ok())
        .unwrap_or_default();

    let records = lines
        .filter_map(|line| match split_line(line, delimiter) {
            Ok(fields) => RawRecord::from_fields(fields),
            Err(reason) => Some(RawRecord::Unreadable(reason)),
        })
        .collect();

    ParseResult {
        records,
        encoding: "utf-8".to_string(),
        delimiter,
        headers,
    }
}

/// Split one line into trimmed fields.
fn split_line(line: &str, delimiter: char) -> Result<Vec<String>, String> {
    if has_open_quote(line, delimiter) {
        return Err("unterminated quoted field".to_string());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => Ok(record.iter().map(str::to_string).collect()),
        Some(Err(e)) => Err(e.to_string()),
        None => Ok(Vec::new()),
    }
}

/// Whether a quoted field is still open at the end of the line.
///
/// A quote only opens a field when it is the field's first character; inside
/// a quoted field `""` is an escaped quote.
fn has_open_quote(line: &str, delimiter: char) -> bool {
    let mut chars = line.chars().peekable();
    let mut field_start = true;
    let mut quoted = false;

    while let Some(c) = chars.next() {
        if quoted {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    quoted = false;
                }
            }
        } else if c == delimiter {
            field_start = true;
            continue;
        } else if c == '"' && field_start {
            quoted = true;
        }
        field_start = false;
    }

    quoted
}

/// Parse delimited bytes, detecting the encoding and, when `delimiter` is
/// `None`, the delimiter.
pub fn parse_delimited_bytes(bytes: &[u8], delimiter: Option<char>) -> ParseResult {
    let (content, encoding) = decode_auto(bytes);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    ParseResult {
        encoding,
        ..parse_delimited(&content, delimiter)
    }
}

/// Parse a delimited file. Fails only when the file cannot be read.
pub fn parse_delimited_file<P: AsRef<Path>>(
    path: P,
    delimiter: Option<char>,
) -> SourceResult<ParseResult> {
    let bytes = read_source(path.as_ref())?;
    Ok(parse_delimited_bytes(&bytes, delimiter))
}

/// Read a whole source file, mapping a missing file to [`SourceError::NotFound`].
pub(crate) fn read_source(path: &Path) -> SourceResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
        _ => SourceError::Io {
            path: path.display().to_string(),
            source: e,
        },
    })
}
