//! Faction catalog discovery and ingestion.

/// Catalog discovery, parsing and caching.
pub mod loader;

pub use loader::{read_catalog, CatalogDiscovery, CatalogLoader};
