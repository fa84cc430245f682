// In-memory product catalog: built once, read by every request.
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::loader::{CatalogLoader, LoadedCatalog};
use crate::query::{suggest_needle, FilterField, ProductFilter, SUGGEST_LIMIT};
use crate::types::{CatalogOverview, Facet, LoadReport, ProductRecord};

#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub total_matches: usize,
    pub query_duration_ms: u64,
}

impl<T> QueryResult<T> {
    pub fn new(items: Vec<T>, total_matches: usize, query_duration_ms: u64) -> Self {
        Self {
            items,
            total_matches,
            query_duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub source_path: Option<PathBuf>,
    pub load: LoadReport,
    pub loaded_at: DateTime<Utc>,
}

impl Default for CatalogMetadata {
    fn default() -> Self {
        Self {
            source_path: None,
            load: LoadReport::default(),
            loaded_at: Utc::now(),
        }
    }
}

/// The product catalog.
///
/// Records keep source row order. Nothing mutates a catalog after it is built,
/// so a shared `Arc<Catalog>` can serve concurrent readers without locking.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<ProductRecord>,
    columns: Vec<String>,
    metadata: CatalogMetadata,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog over already-normalized records. Columns are the union of
    /// record keys in first-seen order.
    pub fn from_records(products: Vec<ProductRecord>) -> Self {
        let columns: IndexSet<&str> = products.iter().flat_map(|p| p.keys()).collect();
        let columns = columns.into_iter().map(str::to_string).collect();
        let load = LoadReport {
            rows_seen: products.len(),
            accepted: products.len(),
            ..Default::default()
        };

        Self {
            products,
            columns,
            metadata: CatalogMetadata {
                load,
                ..Default::default()
            },
        }
    }

    pub fn from_loaded(loaded: LoadedCatalog, source_path: Option<PathBuf>) -> Self {
        Self {
            products: loaded.records,
            columns: loaded.columns,
            metadata: CatalogMetadata {
                source_path,
                load: loaded.report,
                loaded_at: Utc::now(),
            },
        }
    }

    /// Load the table at `path`, failing if it cannot be opened.
    pub fn load(path: &Path) -> Result<Self> {
        let loaded = CatalogLoader::new().load_path(path)?;
        Ok(Self::from_loaded(loaded, Some(path.to_path_buf())))
    }

    /// Startup entry point. An unavailable source is logged and yields an
    /// empty catalog so the rest of the site keeps serving.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => {
                info!(
                    "Catalog ready: {} products, {} columns",
                    catalog.len(),
                    catalog.columns.len()
                );
                catalog
            }
            Err(e) => {
                error!("Product catalog not loaded, serving an empty catalog: {}", e);
                Self {
                    metadata: CatalogMetadata {
                        source_path: Some(path.to_path_buf()),
                        ..Default::default()
                    },
                    ..Default::default()
                }
            }
        }
    }

    /// Every product in load order.
    pub fn list(&self) -> &[ProductRecord] {
        &self.products
    }

    /// Products satisfying every active predicate, in load order.
    pub fn filter(&self, filter: &ProductFilter) -> QueryResult<&ProductRecord> {
        let start_time = Instant::now();

        let items: Vec<&ProductRecord> = if filter.is_unconstrained() {
            self.products.iter().collect()
        } else {
            self.products.iter().filter(|p| filter.matches(p)).collect()
        };

        let duration = start_time.elapsed().as_millis() as u64;
        debug!(
            predicates = filter.active_predicates(),
            matches = items.len(),
            "Filter evaluated"
        );

        let len = items.len();
        QueryResult::new(items, len, duration)
    }

    /// Up to ten distinct product names containing `q`, ignoring case, in
    /// first-occurrence order. A missing or blank query suggests nothing.
    pub fn suggest(&self, q: Option<&str>) -> Vec<&str> {
        let needle = match suggest_needle(q) {
            Some(needle) => needle,
            None => return Vec::new(),
        };

        let mut seen = IndexSet::new();
        for name in self.products.iter().filter_map(|p| p.name()) {
            if name.to_lowercase().contains(&needle) {
                seen.insert(name);
                if seen.len() >= SUGGEST_LIMIT {
                    break;
                }
            }
        }

        seen.into_iter().collect()
    }

    /// First product whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.name() == Some(name))
    }

    /// Distinct values of every filterable column, in first-occurrence order.
    pub fn facets(&self) -> Vec<Facet> {
        FilterField::ALL
            .iter()
            .map(|field| {
                let values: IndexSet<&str> = self
                    .products
                    .iter()
                    .filter_map(|p| p.get(field.column()))
                    .collect();

                Facet {
                    field: field.column().to_string(),
                    values: values.into_iter().map(str::to_string).collect(),
                }
            })
            .collect()
    }

    pub fn overview(&self) -> CatalogOverview {
        CatalogOverview {
            total_products: self.products.len(),
            columns: self.columns.clone(),
            source_path: self.metadata.source_path.clone(),
            load: self.metadata.load,
            loaded_at: self.metadata.loaded_at,
            memory_usage_bytes: self.memory_usage(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn metadata(&self) -> &CatalogMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Rough estimate of heap held by the records.
    pub fn memory_usage(&self) -> usize {
        let base_size = std::mem::size_of::<Self>();
        let records_size: usize = self
            .products
            .iter()
            .map(|p| {
                p.iter()
                    .map(|(k, v)| k.len() + v.map_or(0, str::len) + 64)
                    .sum::<usize>()
            })
            .sum();

        base_size + records_size
    }
}
