//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - sync: run one synchronization pass (default)
//! - list: list stored plugin records
//! - wrapper: print the generated wrapper of a synced tool

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// plugsync - keep plugin records in sync with an MCP bridge
#[derive(Parser, Debug)]
#[command(name = "plugsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull the bridge catalog and reconcile stored plugins
    Sync(SyncArgs),

    /// List stored plugin records
    List {
        /// Show only records managed by sync
        #[arg(short, long)]
        managed: bool,
    },

    /// Print the generated wrapper for a synced tool
    Wrapper {
        /// Tool name as advertised by the bridge
        tool: String,
    },
}

/// Options for a sync pass
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct SyncArgs {
    /// Bridge base URL, overrides the config file
    #[arg(short, long)]
    pub bridge: Option<String>,

    /// Read the catalog from a JSON file instead of the bridge
    #[arg(long, value_name = "PATH")]
    pub catalog_file: Option<PathBuf>,

    /// Reconcile and report without saving
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}
