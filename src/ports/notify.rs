//! Notifier and reloader implementations for hosts without a UI.

use tracing::{error, info};

use super::{ItemReloader, Notifier, NotifyKind};

/// Forwards notifications to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Error => error!(%kind, "{message}"),
            NotifyKind::Success | NotifyKind::Info => info!(%kind, "{message}"),
        }
    }
}

/// Prints notifications for the command line: errors to stderr, the rest to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    /// Suppress success and info messages (used with `--json`).
    pub quiet: bool,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Error => eprintln!("Error: {message}"),
            _ if self.quiet => {}
            NotifyKind::Success | NotifyKind::Info => println!("{message}"),
        }
    }
}

/// Reloader for hosts that render no item list; records the request in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReloader;

impl ItemReloader for TracingReloader {
    fn reload(&self, context: &str, reset_pagination: bool) {
        info!(context, reset_pagination, "item reload requested");
    }
}
