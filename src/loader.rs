//! Streaming CSV ingestion for the product table.
//!
//! Rows are normalized one at a time: header names and cell values are
//! trimmed, empty cells become `null`, and rows whose product name is missing,
//! longer than the limit, or carries markup characters are dropped. A row the
//! reader cannot decode, or whose field count differs from the header, is
//! counted and skipped; only a source that cannot be opened (or a header that
//! cannot be read) fails the whole load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, RejectReason, Result};
use crate::types::{LoadReport, ProductRecord, PRODUCT_NAME};

pub const DEFAULT_MAX_NAME_LEN: usize = 200;

static FORBIDDEN_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>"'&\r\n]"#).unwrap());

const UTF8_BOM: char = '\u{feff}';

/// Records accepted by a load, in source order, with the load counters.
#[derive(Debug, Clone, Default)]
pub struct LoadedCatalog {
    pub records: Vec<ProductRecord>,
    pub columns: Vec<String>,
    pub report: LoadReport,
}

#[derive(Debug, Clone)]
pub struct CatalogLoader {
    max_name_len: usize,
    delimiter: u8,
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self {
            max_name_len: DEFAULT_MAX_NAME_LEN,
            delimiter: b',',
        }
    }

    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load the table at `path`.
    pub fn load_path(&self, path: &Path) -> Result<LoadedCatalog> {
        let file = File::open(path).map_err(|source| CatalogError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let source_bytes = file.metadata().map(|m| m.len()).unwrap_or(0);

        info!(
            "Loading product table from {} ({:.2} MB)",
            path.display(),
            source_bytes as f64 / (1024.0 * 1024.0)
        );

        let mut loaded = self.load_reader(file)?;
        loaded.report.source_bytes = source_bytes;
        Ok(loaded)
    }

    /// Load from any reader. The header row names the columns.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedCatalog> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let columns = normalize_headers(csv_reader.headers()?);
        if !columns.iter().any(|c| c == PRODUCT_NAME) {
            warn!("Header has no '{}' column; every row will be rejected", PRODUCT_NAME);
        }

        let mut loaded = LoadedCatalog {
            columns,
            ..Default::default()
        };

        let mut row = StringRecord::new();
        loop {
            match csv_reader.read_record(&mut row) {
                Ok(false) => break,
                Ok(true) => {
                    loaded.report.rows_seen += 1;
                    match self.normalize_row(&loaded.columns, &row) {
                        Ok(record) => {
                            loaded.records.push(record);
                            loaded.report.accepted += 1;
                        }
                        Err(reason) => {
                            debug!("Row {} rejected: {}", loaded.report.rows_seen, reason);
                            loaded.report.rejected += 1;
                        }
                    }
                }
                Err(e) => {
                    loaded.report.rows_seen += 1;
                    loaded.report.malformed += 1;
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    warn!("Skipping malformed row at line {}: {}", line, e);
                    if !recoverable(&e) {
                        break;
                    }
                }
            }
        }

        info!(
            rows = loaded.report.rows_seen,
            accepted = loaded.report.accepted,
            rejected = loaded.report.rejected,
            malformed = loaded.report.malformed,
            "Product table loaded"
        );

        Ok(loaded)
    }

    /// Build a record from one data row, or say why it is not a product.
    pub fn normalize_row(
        &self,
        columns: &[String],
        row: &StringRecord,
    ) -> std::result::Result<ProductRecord, RejectReason> {
        let mut record = ProductRecord::new();
        for (key, cell) in columns.iter().zip(row.iter()) {
            let value = cell.trim();
            let value = if value.is_empty() { None } else { Some(value.to_string()) };
            record.insert(key.clone(), value);
        }

        self.validate_name(record.name())?;
        Ok(record)
    }

    pub fn validate_name(&self, name: Option<&str>) -> std::result::Result<(), RejectReason> {
        let name = match name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(RejectReason::MissingName),
        };

        if name.chars().count() > self.max_name_len {
            return Err(RejectReason::NameTooLong);
        }

        if FORBIDDEN_NAME_CHARS.is_match(name) {
            return Err(RejectReason::ForbiddenCharacter);
        }

        Ok(())
    }
}

fn normalize_headers(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches(UTF8_BOM) } else { h };
            h.trim().to_string()
        })
        .collect()
}

// Decoding errors leave the reader positioned at the next record; I/O errors do not.
fn recoverable(e: &csv::Error) -> bool {
    !matches!(e.kind(), csv::ErrorKind::Io(_))
}
