//! Incremental CSV output with a lazily established header
//!
//! The header is the field order of the first record of the first
//! non-empty page, written exactly once. Every later record must carry
//! the same field sequence; a divergence is a hard error rather than a
//! silently misaligned column.

use std::fs::File;
use std::path::Path;

use serde_json::Value;

use crate::error::DownloadError;
use crate::page::Record;

/// CSV writer for one output file
pub struct CsvSink {
    writer: csv::Writer<File>,
    header: Option<Vec<String>>,
    rows_written: usize,
}

impl CsvSink {
    /// Create the output file. The header is not written until the
    /// first record arrives.
    pub fn create(path: &Path) -> Result<Self, DownloadError> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self {
            writer,
            header: None,
            rows_written: 0,
        })
    }

    /// Append one page of records, establishing the header from the
    /// first record if not yet set. Returns the number of rows written.
    pub fn write_page(&mut self, records: &[Record]) -> Result<usize, DownloadError> {
        let Some(first) = records.first() else {
            return Ok(0);
        };

        if self.header.is_none() {
            let fields: Vec<String> = first.keys().cloned().collect();
            self.writer.write_record(&fields)?;
            self.header = Some(fields);
        }

        for record in records {
            self.write_row(record)?;
        }
        Ok(records.len())
    }

    fn write_row(&mut self, record: &Record) -> Result<(), DownloadError> {
        let header = self.header.as_ref().expect("header set before rows");
        if record.len() != header.len() {
            let field = record
                .keys()
                .find(|k| !header.contains(*k))
                .cloned()
                .unwrap_or_else(|| header[record.len()..].join(", "));
            return Err(DownloadError::SchemaMismatch { field });
        }
        let mut row = Vec::with_capacity(header.len());
        for field in header {
            let value = record
                .get(field)
                .ok_or_else(|| DownloadError::SchemaMismatch {
                    field: field.clone(),
                })?;
            row.push(render_value(value));
        }
        self.writer.write_record(&row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Total data rows written so far (header excluded).
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush buffered output to disk.
    pub fn finish(&mut self) -> Result<(), DownloadError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Render a JSON scalar as a CSV cell.
///
/// Observations are flat, but a nested value still renders
/// deterministically as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
