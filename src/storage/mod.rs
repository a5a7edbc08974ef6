//! Storage layer for plugsync - key-value persistence of plugin records.
//!
//! `RecordStore` is the raw key -> JSON values contract with two backends (JSONL files
//! and memory). `PluginStore` sits on top and gives a sync pass typed, exclusive
//! load/commit access to one key.

mod jsonl;
mod memory;
mod plugins;
mod traits;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use plugins::{PLUGINS_KEY, PluginStore, Transaction};
pub use traits::{RecordStore, validate_key};
