//! CLI module for plugsync - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
