//! Interfaces to the collaborators around the engine.
//!
//! The engine owns no storage, network or presentation code. Hosts provide
//! these traits; the crate ships small implementations for the CLI and tests
//! ([`StaticCatalog`], [`TracingNotifier`], [`ConsoleNotifier`],
//! [`TracingReloader`], and the gateways in [`crate::storage`]).

pub mod catalog;
pub mod notify;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::models::{FilterState, PresetCollection};

pub use catalog::StaticCatalog;
pub use notify::{ConsoleNotifier, TracingNotifier, TracingReloader};

/// One base model known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Base-model label, matched against preset patterns.
    pub label: String,
    /// Number of items carrying this base model.
    #[serde(default)]
    pub count: u64,
}

impl CatalogEntry {
    /// Creates an entry.
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Source of the base-model labels currently available in a context.
///
/// The token is advisory: an implementation may stop early when it is
/// cancelled, but callers discard stale results either way.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Lists the base models available in `context`, in catalog order.
    async fn list_base_models(
        &self,
        context: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogEntry>>;
}

/// Key-value persistence keyed by context name.
pub trait PersistenceGateway: Send + Sync {
    /// Reads the stored preset collection of a context as an untyped value.
    fn read_presets(&self, context: &str) -> Result<Option<Value>>;

    /// Replaces the stored preset collection of a context.
    fn write_presets(&self, context: &str, presets: &PresetCollection) -> Result<()>;

    /// Removes the context entry from the stored collections.
    fn remove_presets(&self, context: &str) -> Result<()>;

    /// Reads the name of the preset currently marked active.
    fn read_active_preset(&self, context: &str) -> Result<Option<String>>;

    /// Writes (or clears, with `None`) the active preset marker.
    fn write_active_preset(&self, context: &str, name: Option<&str>) -> Result<()>;

    /// Reads the live filter selection as an untyped value.
    fn read_filters(&self, context: &str) -> Result<Option<Value>>;

    /// Writes the live filter selection.
    fn write_filters(&self, context: &str, filters: &FilterState) -> Result<()>;
}

/// Reloads the item list after a committed filter change.
pub trait ItemReloader: Send + Sync {
    /// Requests a reload of `context`, optionally returning to the first page.
    fn reload(&self, context: &str, reset_pagination: bool);
}

/// Kind of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyKind {
    /// Operation completed.
    Success,
    /// Operation failed.
    Error,
    /// Informational message.
    Info,
}

impl std::fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Fire-and-forget user notifications.
pub trait Notifier: Send + Sync {
    /// Surfaces a message to the user.
    fn notify(&self, kind: NotifyKind, message: &str);
}
