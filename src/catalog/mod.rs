//! Catalog - fetching the bridge's tool catalog and flattening it

mod client;
mod normalize;

pub use client::{
    BridgeClient, BridgeConfig, CatalogSource, DEFAULT_BRIDGE_URL, DEFAULT_CATALOG_PATH, FileCatalog, StaticCatalog,
    join_url,
};
pub use normalize::{NormalizedCatalog, SourcedTool, normalize};
