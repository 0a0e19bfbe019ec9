//! Structured markup (XML) records.
//!
//! Every element named like the record tag is one record; its child elements,
//! in document order, are the fields. A field's value is its text, or its
//! `value` attribute when the element has no text, so both of these read the
//! same:
//!
//! ```xml
//! <employee>
//!   <firstName>Jan</firstName>
//!   ...
//! </employee>
//!
//! <bean class="Employee">
//!   <constructor-arg value="Jan"/>
//!   ...
//! </bean>
//! ```
//!
//! Elements with any other tag are skipped. The whole document is read before
//! any record is returned, so a malformed document fails as a unit.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{decode_auto, read_source, RawRecord};
use crate::error::{SourceError, SourceResult};

pub const DEFAULT_RECORD_TAG: &str = "employee";

/// A record element being read.
struct RecordBuilder {
    /// Depth of the record element itself.
    depth: usize,
    fields: Vec<String>,
    current: Option<FieldBuilder>,
}

struct FieldBuilder {
    text: String,
    value_attr: Option<String>,
}

impl FieldBuilder {
    fn new(element: &BytesStart<'_>) -> SourceResult<Self> {
        Ok(Self {
            text: String::new(),
            value_attr: value_attribute(element)?,
        })
    }

    fn finish(self) -> String {
        let text = self.text.trim();
        if text.is_empty() {
            self.value_attr.unwrap_or_default().trim().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Read all records from a markup document.
pub fn parse_markup(content: &str, record_tag: &str) -> SourceResult<Vec<RawRecord>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut record: Option<RecordBuilder> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SourceError::Markup(e.to_string()))?;

        match event {
            Event::Start(element) => {
                depth += 1;
                match record.as_mut() {
                    None if is_record(&element, record_tag) => {
                        record = Some(RecordBuilder {
                            depth,
                            fields: Vec::new(),
                            current: None,
                        });
                    }
                    Some(r) if depth == r.depth + 1 => {
                        r.current = Some(FieldBuilder::new(&element)?);
                    }
                    _ => {}
                }
            }
            Event::Empty(element) => match record.as_mut() {
                None if is_record(&element, record_tag) => {
                    // a record without fields is blank
                }
                Some(r) if depth == r.depth => {
                    let field = FieldBuilder::new(&element)?;
                    r.fields.push(field.finish());
                }
                _ => {}
            },
            Event::Text(text) => {
                if let Some(field) = record.as_mut().and_then(|r| r.current.as_mut()) {
                    let value = text
                        .unescape()
                        .map_err(|e| SourceError::Markup(e.to_string()))?;
                    field.text.push_str(&value);
                }
            }
            Event::CData(data) => {
                if let Some(field) = record.as_mut().and_then(|r| r.current.as_mut()) {
                    field.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some(r) = record.as_mut() {
                    if depth == r.depth + 1 {
                        if let Some(field) = r.current.take() {
                            r.fields.push(field.finish());
                        }
                    } else if depth == r.depth {
                        if let Some(done) = record.take() {
                            records.extend(RawRecord::from_fields(done.fields));
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if record.is_some() {
        return Err(SourceError::Markup(format!(
            "document ended inside a <{}> element",
            record_tag
        )));
    }

    Ok(records)
}

/// Decode markup bytes (encoding auto-detected) and read its records.
pub fn parse_markup_bytes(bytes: &[u8], record_tag: &str) -> SourceResult<Vec<RawRecord>> {
    let (content, _encoding) = decode_auto(bytes);
    parse_markup(&content, record_tag)
}

/// Read records from a markup file.
pub fn parse_markup_file<P: AsRef<Path>>(path: P, record_tag: &str) -> SourceResult<Vec<RawRecord>> {
    let bytes = read_source(path.as_ref())?;
    parse_markup_bytes(&bytes, record_tag)
}

fn is_record(element: &BytesStart<'_>, record_tag: &str) -> bool {
    element.local_name().as_ref() == record_tag.as_bytes()
}

fn value_attribute(element: &BytesStart<'_>) -> SourceResult<Option<String>> {
    let attribute = element
        .try_get_attribute("value")
        .map_err(|e| SourceError::Markup(e.to_string()))?;

    attribute
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .map_err(|e| SourceError::Markup(e.to_string()))
        })
        .transpose()
}
