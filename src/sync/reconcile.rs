//! Reconciliation of stored plugin records against a fresh catalog
//!
//! The reconciler is a pure function of its inputs: it splits the stored records by
//! origin, rebuilds the managed set from the catalog while reusing identities by external
//! key, and diffs old against new. Foreign records are moved through without being looked at.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::wrapper::generate_wrapper;
use crate::catalog::NormalizedCatalog;
use crate::domain::{PluginRecord, StoredRecord};
use crate::id::{external_key, generate_plugin_id};

/// Counts describing one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
    /// Managed records after the pass
    pub total: usize,
    /// Sources that contributed tools
    pub categories: usize,
}

impl ChangeSummary {
    /// Returns true if nothing was added or removed
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.added, "added"),
            (self.removed, "removed"),
            (self.unchanged, "unchanged"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();

        let changes = if parts.is_empty() {
            "no changes".to_string()
        } else {
            parts.join(", ")
        };

        write!(
            f,
            "MCP sync: {}. {} {} across {} {}.",
            changes,
            self.total,
            if self.total == 1 { "plugin" } else { "plugins" },
            self.categories,
            if self.categories == 1 { "category" } else { "categories" },
        )
    }
}

/// Output of a reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Foreign records first, then managed records in catalog order
    pub merged: Vec<StoredRecord>,
    /// External keys new in this pass
    pub added: Vec<String>,
    /// External keys dropped in this pass
    pub removed: Vec<String>,
    pub summary: ChangeSummary,
}

impl Reconciliation {
    /// The managed records of the merged set, in catalog order
    pub fn managed(&self) -> impl Iterator<Item = &PluginRecord> {
        self.merged.iter().filter_map(StoredRecord::as_managed)
    }
}

/// Rebuilds the managed record set from a catalog
#[derive(Debug, Clone)]
pub struct Reconciler {
    bridge_base: String,
}

impl Reconciler {
    /// Create a reconciler whose wrappers call the given bridge
    pub fn new(bridge_base: impl Into<String>) -> Self {
        Self {
            bridge_base: bridge_base.into(),
        }
    }

    /// Reconcile the current record set against a normalized catalog
    pub fn reconcile(&self, catalog: &NormalizedCatalog, current: Vec<StoredRecord>) -> Reconciliation {
        let (managed_old, foreign) = partition(current);

        let mut old_ids: HashMap<&str, Uuid> = HashMap::new();
        for record in &managed_old {
            old_ids.entry(record.external_key.as_str()).or_insert(record.identity);
        }

        let mut managed_new: Vec<PluginRecord> = Vec::with_capacity(catalog.tools.len());
        let mut slots: HashMap<String, usize> = HashMap::new();

        for sourced in &catalog.tools {
            let key = external_key(&sourced.tool.name);
            let wrapper = generate_wrapper(&self.bridge_base, &sourced.tool);

            match slots.get(&key) {
                Some(&slot) => {
                    // Same key seen earlier in this pass: last one wins, first position stays
                    let identity = managed_new[slot].identity;
                    debug!(
                        "Tool '{}' from '{}' replaces the one from '{}'",
                        sourced.tool.name, sourced.source, managed_new[slot].source
                    );
                    managed_new[slot] = PluginRecord::managed(identity, &sourced.source, &sourced.tool, wrapper);
                }
                None => {
                    let identity = match old_ids.get(key.as_str()) {
                        Some(&identity) => {
                            debug!("Keeping identity {} for {}", identity, key);
                            identity
                        }
                        None => {
                            let identity = generate_plugin_id();
                            debug!("New identity {} for {}", identity, key);
                            identity
                        }
                    };
                    slots.insert(key, managed_new.len());
                    managed_new.push(PluginRecord::managed(identity, &sourced.source, &sourced.tool, wrapper));
                }
            }
        }

        let added: Vec<String> = managed_new
            .iter()
            .filter(|r| !old_ids.contains_key(r.external_key.as_str()))
            .map(|r| r.external_key.clone())
            .collect();

        let mut seen = HashSet::new();
        let removed: Vec<String> = managed_old
            .iter()
            .filter(|r| !slots.contains_key(&r.external_key))
            .filter(|r| seen.insert(r.external_key.as_str()))
            .map(|r| r.external_key.clone())
            .collect();

        let summary = ChangeSummary {
            added: added.len(),
            removed: removed.len(),
            unchanged: managed_new.len() - added.len(),
            total: managed_new.len(),
            categories: catalog.category_count(),
        };

        let merged = foreign
            .into_iter()
            .map(StoredRecord::Foreign)
            .chain(managed_new.into_iter().map(StoredRecord::Managed))
            .collect();

        Reconciliation {
            merged,
            added,
            removed,
            summary,
        }
    }
}

/// Split records into (managed, foreign) by origin tag, keeping relative order
pub fn partition(records: Vec<StoredRecord>) -> (Vec<PluginRecord>, Vec<Value>) {
    let mut managed = Vec::new();
    let mut foreign = Vec::new();
    for record in records {
        match record {
            StoredRecord::Managed(record) => managed.push(record),
            StoredRecord::Foreign(value) => foreign.push(value),
        }
    }
    (managed, foreign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::normalize;
    use crate::domain::{Origin, SourceCatalog, ToolDescriptor};
    use serde_json::json;

    const BRIDGE: &str = "http://localhost:3000";

    fn catalog_of(names: &[&str]) -> NormalizedCatalog {
        let tools = names.iter().map(|n| ToolDescriptor::new(*n, format!("{} tool", n))).collect();
        normalize(&SourceCatalog::new().with_source("main", tools))
    }

    fn foreign(key: &str) -> StoredRecord {
        StoredRecord::Foreign(json!({
            "identity": format!("{}-plugin", key),
            "externalKey": key,
            "author": "someone"
        }))
    }

    fn keys(records: &[StoredRecord]) -> Vec<&str> {
        records.iter().map(|r| r.external_key().unwrap_or("")).collect()
    }

    fn managed(result: &Reconciliation) -> Vec<&PluginRecord> {
        result.managed().collect()
    }

    #[test]
    fn test_calc_add_from_empty() {
        let catalog = normalize(
            &SourceCatalog::from_value(json!({
                "calc": { "tools": [{
                    "name": "add",
                    "description": "Adds numbers",
                    "inputSchema": { "required": ["x"] }
                }]}
            }))
            .unwrap(),
        );

        let result = Reconciler::new(BRIDGE).reconcile(&catalog, vec![]);

        assert_eq!(result.merged.len(), 1);
        let record = managed(&result)[0];
        assert_eq!(record.origin, Origin::Managed);
        assert_eq!(record.external_key, "mcp_add");
        assert_eq!(record.invocation_spec.name, "mcp_add");
        assert_eq!(result.added, vec!["mcp_add"]);
        assert_eq!(
            result.summary,
            ChangeSummary {
                added: 1,
                removed: 0,
                unchanged: 0,
                total: 1,
                categories: 1
            }
        );
    }

    #[test]
    fn test_diff_correctness() {
        let reconciler = Reconciler::new(BRIDGE);
        let first = reconciler.reconcile(&catalog_of(&["a", "b", "c"]), vec![]);
        let second = reconciler.reconcile(&catalog_of(&["b", "c", "d"]), first.merged);

        assert_eq!(second.added, vec!["mcp_d"]);
        assert_eq!(second.removed, vec!["mcp_a"]);
        assert_eq!(second.summary.unchanged, 2);
        assert_eq!(second.summary.total, 3);
    }

    #[test]
    fn test_identity_survives_metadata_changes() {
        let reconciler = Reconciler::new(BRIDGE);
        let first = reconciler.reconcile(&catalog_of(&["search"]), vec![]);
        let original_id = managed(&first)[0].identity;

        let changed = normalize(&SourceCatalog::new().with_source(
            "other",
            vec![ToolDescriptor::new("search", "Completely new description")
                .with_schema(json!({ "required": ["query"] }))],
        ));
        let second = reconciler.reconcile(&changed, first.merged);

        let record = managed(&second)[0];
        assert_eq!(record.identity, original_id);
        assert_eq!(record.display.overview, "Completely new description");
        assert_eq!(record.source, "other");
        assert!(record.wrapper_body.contains(r#"{ "query": data }"#));
    }

    #[test]
    fn test_foreign_records_pass_through_unchanged() {
        let foreign_a = foreign("weather");
        // A foreign record whose key collides with a managed tool stays foreign and untouched
        let foreign_b = foreign("mcp_add");
        let current = vec![foreign_a.clone(), foreign_b.clone()];

        let result = Reconciler::new(BRIDGE).reconcile(&catalog_of(&["add"]), current);

        assert_eq!(result.merged[0], foreign_a);
        assert_eq!(result.merged[1], foreign_b);
        assert_eq!(result.merged[2].origin(), Origin::Managed);
        assert_eq!(result.added, vec!["mcp_add"]);
    }

    #[test]
    fn test_foreign_values_of_any_shape_pass_through() {
        let odd = vec![
            StoredRecord::Foreign(json!({ "externalKey": "minimal" })),
            StoredRecord::Foreign(json!({ "identity": "notes-plugin-1", "display": { "title": 3 } })),
            StoredRecord::Foreign(json!(null)),
        ];

        let result = Reconciler::new(BRIDGE).reconcile(&catalog_of(&["a"]), odd.clone());

        assert_eq!(result.merged[..3], odd[..]);
        assert_eq!(result.merged.len(), 4);
        assert_eq!(result.summary.total, 1);
    }

    #[test]
    fn test_partition_completeness_and_order() {
        let reconciler = Reconciler::new(BRIDGE);
        let seeded = reconciler.reconcile(&catalog_of(&["x", "y"]), vec![]).merged;

        let mut current = vec![foreign("one")];
        current.push(seeded[0].clone());
        current.push(foreign("two"));
        current.push(seeded[1].clone());

        let result = reconciler.reconcile(&catalog_of(&["y", "z"]), current);

        assert_eq!(keys(&result.merged), vec!["one", "two", "mcp_y", "mcp_z"]);
        let (managed, foreign) = partition(result.merged.clone());
        assert_eq!(foreign.len(), 2);
        assert_eq!(managed.len(), result.summary.total);
        assert_eq!(result.merged.len(), foreign.len() + managed.len());
    }

    #[test]
    fn test_idempotence() {
        let reconciler = Reconciler::new(BRIDGE);
        let catalog = catalog_of(&["a", "b"]);
        let first = reconciler.reconcile(&catalog, vec![foreign("keep")]);
        let second = reconciler.reconcile(&catalog, first.merged.clone());

        assert!(second.added.is_empty());
        assert!(second.removed.is_empty());
        assert!(second.summary.is_noop());
        assert_eq!(second.summary.unchanged, 2);
        assert_eq!(second.merged, first.merged);
    }

    #[test]
    fn test_removed_everything_on_empty_catalog() {
        let reconciler = Reconciler::new(BRIDGE);
        let first = reconciler.reconcile(&catalog_of(&["a", "b"]), vec![foreign("keep")]);
        let second = reconciler.reconcile(&NormalizedCatalog::default(), first.merged);

        assert_eq!(keys(&second.merged), vec!["keep"]);
        assert_eq!(second.removed, vec!["mcp_a", "mcp_b"]);
        assert_eq!(second.summary.total, 0);
    }

    #[test]
    fn test_duplicate_tool_names_last_wins_first_position() {
        let catalog = normalize(
            &SourceCatalog::new()
                .with_source("alpha", vec![ToolDescriptor::new("search", "alpha search"), ToolDescriptor::new("x", "")])
                .with_source("beta", vec![ToolDescriptor::new("search", "beta search")]),
        );

        let result = Reconciler::new(BRIDGE).reconcile(&catalog, vec![]);

        assert_eq!(keys(&result.merged), vec!["mcp_search", "mcp_x"]);
        let search = managed(&result)[0];
        assert_eq!(search.source, "beta");
        assert_eq!(search.display.overview, "beta search");
        assert_eq!(result.summary.added, 2);
        assert_eq!(result.summary.categories, 2);
    }

    #[test]
    fn test_duplicate_old_keys_reuse_first_identity() {
        let reconciler = Reconciler::new(BRIDGE);
        let seeded = reconciler.reconcile(&catalog_of(&["a"]), vec![]);
        let first = managed(&seeded)[0].clone();
        let mut dup = first.clone();
        dup.identity = Uuid::new_v4();
        let current = vec![first.clone().into(), dup.into()];

        let result = reconciler.reconcile(&catalog_of(&["a"]), current);
        assert_eq!(result.merged.len(), 1);
        assert_eq!(managed(&result)[0].identity, first.identity);
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_wrapper_uses_bridge_base() {
        let result = Reconciler::new("http://bridge:9000").reconcile(&catalog_of(&["a"]), vec![]);
        assert!(managed(&result)[0].wrapper_body.contains("http://bridge:9000/mcp/tools/a/call"));
    }

    #[test]
    fn test_summary_rendering() {
        let summary = ChangeSummary {
            added: 1,
            removed: 0,
            unchanged: 2,
            total: 3,
            categories: 1,
        };
        assert_eq!(summary.to_string(), "MCP sync: 1 added, 2 unchanged. 3 plugins across 1 category.");

        let summary = ChangeSummary {
            added: 0,
            removed: 4,
            unchanged: 1,
            total: 1,
            categories: 2,
        };
        assert_eq!(summary.to_string(), "MCP sync: 4 removed, 1 unchanged. 1 plugin across 2 categories.");

        let summary = ChangeSummary::default();
        assert_eq!(summary.to_string(), "MCP sync: no changes. 0 plugins across 0 categories.");
    }
}
