pub mod memory;

pub use memory::{Catalog, CatalogMetadata, QueryResult};
