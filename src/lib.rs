//! EOCR product catalog.
//!
//! The product table is a CSV file read once at startup into an in-memory
//! [`Catalog`]. Rows without a usable `제품` name are dropped during the load.
//! The catalog answers three queries: list everything, filter by
//! field predicates, and suggest product names for a partial query.
//!
//! ```no_run
//! use hteng_catalog::{Catalog, ProductFilter};
//!
//! let catalog = Catalog::load("Resource/EOCR설정표.csv".as_ref())?;
//! let filter = ProductFilter::from_params([("제품군", "전자식"), ("누설지락", "O")]);
//! for product in catalog.filter(&filter).items {
//!     println!("{}", product.name().unwrap_or_default());
//! }
//! # Ok::<(), hteng_catalog::CatalogError>(())
//! ```

pub mod cli;
pub mod cli_types;
pub mod config;
pub mod error;
pub mod http;
pub mod loader;
pub mod logging;
pub mod query;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use cli::CliApp;
pub use config::{LogConfig, ServerConfig};
pub use error::{CatalogError, RejectReason, Result};
pub use loader::{CatalogLoader, LoadedCatalog};
pub use query::{FilterField, ProductFilter, MATCH_ALL, SUGGEST_LIMIT};
pub use storage::memory::{Catalog, CatalogMetadata, QueryResult};
pub use types::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
