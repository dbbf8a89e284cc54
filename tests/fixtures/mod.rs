//! Shared test fixtures for engine and CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use filter_presets::models::{ContextCapabilities, FilterState};
use filter_presets::ports::{
    CatalogEntry, CatalogService, ItemReloader, Notifier, NotifyKind, StaticCatalog,
};
use filter_presets::services::{Collaborators, PresetApplicationCoordinator, PresetStore};
use filter_presets::storage::MemoryGateway;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Context used by most tests.
pub const CONTEXT: &str = "models";

/// Labels of the default test catalog.
pub const CATALOG_LABELS: &[&str] = &["SDXL 1.0", "SDXL Turbo", "SD 1.5", "Flux.1 D"];

/// Notifier that records every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(NotifyKind, String)>>,
}

impl RecordingNotifier {
    /// All recorded notifications in order.
    pub fn events(&self) -> Vec<(NotifyKind, String)> {
        self.events.lock().clone()
    }

    /// Messages of the given kind.
    pub fn messages(&self, kind: NotifyKind) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Error messages.
    pub fn errors(&self) -> Vec<String> {
        self.messages(NotifyKind::Error)
    }

    /// Forgets everything recorded so far.
    pub fn reset(&self) {
        self.events.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotifyKind, message: &str) {
        self.events.lock().push((kind, message.to_string()));
    }
}

/// Reloader that records every reload request.
#[derive(Debug, Default)]
pub struct RecordingReloader {
    calls: Mutex<Vec<(String, bool)>>,
}

impl RecordingReloader {
    /// Recorded `(context, reset_pagination)` pairs.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().clone()
    }
}

impl ItemReloader for RecordingReloader {
    fn reload(&self, context: &str, reset_pagination: bool) {
        self.calls
            .lock()
            .push((context.to_string(), reset_pagination));
    }
}

/// Catalog whose answers are released by the test.
///
/// Each call takes the next gate (in the order gates were created), reports
/// that it started, then waits until the test sends the answer.
pub struct GatedCatalog {
    gates: Mutex<VecDeque<oneshot::Receiver<Result<Vec<CatalogEntry>, String>>>>,
    started: mpsc::UnboundedSender<()>,
}

impl GatedCatalog {
    /// Creates the catalog and the receiver of its "lookup started" signals.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<()>) {
        let (started, rx) = mpsc::unbounded_channel();
        let catalog = Arc::new(Self {
            gates: Mutex::new(VecDeque::new()),
            started,
        });
        (catalog, rx)
    }

    /// Queues a gate for the next lookup; send on the returned sender to answer it.
    pub fn gate(&self) -> oneshot::Sender<Result<Vec<CatalogEntry>, String>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push_back(rx);
        tx
    }
}

#[async_trait]
impl CatalogService for GatedCatalog {
    async fn list_base_models(
        &self,
        _context: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CatalogEntry>> {
        let gate = self.gates.lock().pop_front();
        let Some(gate) = gate else {
            anyhow::bail!("no gate queued");
        };
        let _ = self.started.send(());
        match gate.await {
            Ok(Ok(entries)) => Ok(entries),
            Ok(Err(reason)) => anyhow::bail!(reason),
            Err(_) => anyhow::bail!("gate dropped"),
        }
    }
}

/// Catalog that always fails.
pub struct FailingCatalog;

#[async_trait]
impl CatalogService for FailingCatalog {
    async fn list_base_models(
        &self,
        _context: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CatalogEntry>> {
        anyhow::bail!("catalog offline")
    }
}

/// Catalog entries for the given labels.
pub fn entries(labels: &[&str]) -> Vec<CatalogEntry> {
    labels.iter().map(|l| CatalogEntry::new(*l, 1)).collect()
}

/// Catalog with [`CATALOG_LABELS`].
pub fn default_catalog() -> Arc<StaticCatalog> {
    Arc::new(StaticCatalog::from_labels(CATALOG_LABELS.iter().copied()))
}

/// A coordinator wired to in-memory collaborators.
pub struct Harness {
    pub gateway: Arc<MemoryGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub reloader: Arc<RecordingReloader>,
    pub coordinator: Arc<PresetApplicationCoordinator>,
}

impl Harness {
    /// Harness for [`CONTEXT`] with default capabilities.
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self::with(CONTEXT, ContextCapabilities::default(), catalog)
    }

    /// Harness for a specific context.
    pub fn with(
        context: &str,
        capabilities: ContextCapabilities,
        catalog: Arc<dyn CatalogService>,
    ) -> Self {
        Self::on_gateway(Arc::new(MemoryGateway::new()), context, capabilities, catalog)
    }

    /// Harness sharing an existing gateway, e.g. to simulate a new session.
    pub fn on_gateway(
        gateway: Arc<MemoryGateway>,
        context: &str,
        capabilities: ContextCapabilities,
        catalog: Arc<dyn CatalogService>,
    ) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let reloader = Arc::new(RecordingReloader::default());
        let collaborators = Collaborators {
            gateway: gateway.clone(),
            catalog,
            reloader: reloader.clone(),
            notifier: notifier.clone(),
        };
        let store = Arc::new(PresetStore::new(
            context,
            collaborators.gateway.clone(),
            collaborators.notifier.clone(),
        ));
        let coordinator = Arc::new(PresetApplicationCoordinator::new(
            capabilities,
            store,
            collaborators,
        ));
        coordinator.restore();

        Self {
            gateway,
            notifier,
            reloader,
            coordinator,
        }
    }

    /// Stores a preset directly, bypassing the live selection.
    pub fn seed_preset(&self, name: &str, filters: &FilterState) {
        self.coordinator
            .store()
            .create(name, filters, false)
            .expect("seed preset");
        self.notifier.reset();
    }
}

/// Selection with the given base-model patterns and one included tag.
pub fn selection_with_base_models(patterns: &[&str]) -> FilterState {
    let mut state = FilterState::new();
    for pattern in patterns {
        state.toggle_base_model(pattern);
    }
    state.toggle_tag("character");
    state
}

/// Selection with one included tag.
pub fn tag_selection(tag: &str) -> FilterState {
    let mut state = FilterState::new();
    state.toggle_tag(tag);
    state
}

// ============================================================================
// CLI helpers
// ============================================================================

/// Path to the filter-presets binary
pub fn bin() -> String {
    std::env::var("CARGO_BIN_EXE_filter-presets")
        .unwrap_or_else(|_| env!("CARGO_BIN_EXE_filter-presets").to_string())
}

/// Creates a Command with isolated config directory for testing.
pub fn isolated_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(bin());
    cmd.env("FILTER_PRESETS_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}

/// Writes a catalog JSON file with [`CATALOG_LABELS`] and returns its path.
pub fn write_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("catalog.json");
    let json = serde_json::to_string(&entries(CATALOG_LABELS)).expect("serialize catalog");
    std::fs::write(&path, json).expect("write catalog");
    path
}
