//! Notification sinks
//!
//! A sync pass reports exactly one message per run through an injected `Notifier`.

use std::sync::Mutex;

use colored::*;
use log::{error, info};

/// How loud a notification is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Fire-and-forget message sink
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Prints notifications to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => {
                info!("{}", message);
                println!("{} {}", "✓".green(), message);
            }
            Severity::Error => {
                error!("{}", message);
                eprintln!("{} {}", "✗".red(), message.red());
            }
        }
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far, oldest first
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((severity, message.to_string()));
        }
    }
}
