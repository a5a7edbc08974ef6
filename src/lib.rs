//! plugsync - keeps local plugin records in step with an MCP bridge
//!
//! A sync pass fetches the bridge's tool catalog, rebuilds the managed plugin records
//! from it (keeping identities stable by external key), leaves foreign records alone,
//! and persists the merged set.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod id;
pub mod notify;
pub mod storage;
pub mod sync;

pub use error::{Result, SyncError};
