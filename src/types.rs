use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column holding the product name. Every record in the catalog has it.
pub const PRODUCT_NAME: &str = "제품";
/// Free-text description column.
pub const DESCRIPTION: &str = "상세설명";

/// One row of the product table.
///
/// Columns are not fixed: they are whatever the CSV header declares, trimmed.
/// Cells that were empty after trimming are stored as `None` and serialize as
/// JSON `null`. Column order follows the header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRecord {
    fields: IndexMap<String, Option<String>>,
}

impl ProductRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.insert(key, value.map(str::to_string));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.fields.insert(key.into(), value);
    }

    /// Value of `key`, `None` when the column is absent or the cell was empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// The product name. Records built by the loader always have one.
    pub fn name(&self) -> Option<&str> {
        self.get(PRODUCT_NAME)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Counters produced by a single catalog load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Data rows read after the header, blank lines excluded.
    pub rows_seen: usize,
    pub accepted: usize,
    /// Rows dropped by product-name validation.
    pub rejected: usize,
    /// Rows the CSV reader could not decode.
    pub malformed: usize,
    pub source_bytes: u64,
}

impl LoadReport {
    pub fn is_consistent(&self) -> bool {
        self.rows_seen == self.accepted + self.rejected + self.malformed
    }
}

/// Distinct values observed for one filterable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub field: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOverview {
    pub total_products: usize,
    pub columns: Vec<String>,
    pub source_path: Option<PathBuf>,
    pub load: LoadReport,
    pub loaded_at: DateTime<Utc>,
    pub memory_usage_bytes: usize,
}
