//! One synchronization pass
//!
//! fetch -> normalize -> load -> reconcile -> save -> notify. The catalog is fetched
//! before storage is touched, and saving is the last fallible step, so any failure
//! leaves stored records as they were.

use chrono::{DateTime, Utc};
use log::{error, info};

use super::reconcile::{Reconciler, Reconciliation};
use crate::catalog::{CatalogSource, normalize};
use crate::error::Result;
use crate::notify::{Notifier, Severity};
use crate::storage::{PluginStore, RecordStore};

/// Result of a successful pass
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub reconciliation: Reconciliation,
    /// False for dry runs
    pub saved: bool,
    /// The stored records were unreadable and the pass started from nothing
    pub baseline_recovered: bool,
    /// When the pass completed, shown by the CLI
    pub finished_at: DateTime<Utc>,
}

/// Wires the collaborators of one pass together
pub struct SyncPass<'a, S: RecordStore> {
    catalog: &'a dyn CatalogSource,
    store: &'a PluginStore<S>,
    notifier: &'a dyn Notifier,
    reconciler: Reconciler,
    dry_run: bool,
}

impl<'a, S: RecordStore> SyncPass<'a, S> {
    pub fn new(
        catalog: &'a dyn CatalogSource,
        store: &'a PluginStore<S>,
        notifier: &'a dyn Notifier,
        bridge_base: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            store,
            notifier,
            reconciler: Reconciler::new(bridge_base),
            dry_run: false,
        }
    }

    /// Reconcile and report without saving
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the pass, sending exactly one notification
    pub async fn run(&self) -> Result<SyncOutcome> {
        match self.execute().await {
            Ok(outcome) => {
                let mut message = outcome.reconciliation.summary.to_string();
                if !outcome.saved {
                    message.push_str(" (dry run, nothing saved)");
                }
                self.notifier.notify(&message, Severity::Info);
                Ok(outcome)
            }
            Err(e) => {
                error!("Sync pass failed: {}", e);
                self.notifier.notify(&format!("MCP sync failed: {}", e), Severity::Error);
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<SyncOutcome> {
        info!("Starting sync from {}", self.catalog.describe());
        let catalog = self.catalog.fetch_catalog().await?;
        let normalized = normalize(&catalog);

        let mut tx = self.store.begin().await;
        let current = tx.load().await;
        let baseline_recovered = tx.recovered();

        let reconciliation = self.reconciler.reconcile(&normalized, current);
        info!(
            "Reconciled: +{} -{} ={} ({} merged records)",
            reconciliation.added.len(),
            reconciliation.removed.len(),
            reconciliation.summary.unchanged,
            reconciliation.merged.len()
        );

        let saved = if self.dry_run {
            info!("Dry run, skipping save");
            false
        } else {
            tx.commit(&reconciliation.merged).await?;
            true
        };

        Ok(SyncOutcome {
            reconciliation,
            saved,
            baseline_recovered,
            finished_at: Utc::now(),
        })
    }
}
