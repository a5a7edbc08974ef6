//! Catalog normalization
//!
//! Flattens the per-source catalog into one ordered tool sequence tagged with source names.

use std::collections::BTreeSet;

use log::debug;

use crate::domain::{SourceCatalog, ToolDescriptor};

/// A tool together with the source that advertised it
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedTool {
    pub source: String,
    pub tool: ToolDescriptor,
}

/// Flat, ordered view of a catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedCatalog {
    /// Tools in source order, then in-source order
    pub tools: Vec<SourcedTool>,
    /// Sources that contributed at least one tool
    pub sources: BTreeSet<String>,
}

impl NormalizedCatalog {
    /// Number of distinct contributing sources
    pub fn category_count(&self) -> usize {
        self.sources.len()
    }
}

/// Flatten a catalog
///
/// Entries without a tool array contribute nothing. Tools sharing a name across sources
/// are all emitted; the reconciler resolves them last-wins in this order.
pub fn normalize(catalog: &SourceCatalog) -> NormalizedCatalog {
    let mut normalized = NormalizedCatalog::default();

    for entry in catalog.entries() {
        let Some(tools) = &entry.tools else {
            debug!("Source '{}' has no tool list, skipping", entry.name);
            continue;
        };
        if tools.is_empty() {
            continue;
        }

        normalized.sources.insert(entry.name.clone());
        normalized.tools.extend(tools.iter().map(|tool| SourcedTool {
            source: entry.name.clone(),
            tool: tool.clone(),
        }));
    }

    debug!(
        "Normalized {} tools from {} sources",
        normalized.tools.len(),
        normalized.category_count()
    );
    normalized
}
