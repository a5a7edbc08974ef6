//! Domain types for plugsync
//!
//! This module contains the core domain types:
//! - ToolDescriptor / SourceCatalog: what the bridge advertises
//! - PluginRecord / StoredRecord: what gets persisted, split by its origin tag

pub mod plugin_record;
pub mod tool;

pub use plugin_record::{DisplayInfo, InvocationSpec, Origin, PLUGIN_EMOJI, PluginRecord, StoredRecord};
pub use tool::{SourceCatalog, SourceEntry, ToolDescriptor};
