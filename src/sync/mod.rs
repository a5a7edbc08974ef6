//! Sync - reconciliation of plugin records and the pass that drives it

mod pass;
mod reconcile;
mod wrapper;

pub use pass::{SyncOutcome, SyncPass};
pub use reconcile::{ChangeSummary, Reconciler, Reconciliation, partition};
pub use wrapper::{generate_wrapper, request_body, tool_call_url, wrapper_function_name};
