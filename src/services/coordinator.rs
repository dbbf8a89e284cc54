//! Race-safe application of presets to the live selection.
//!
//! Applying a preset is the only asynchronous step in the engine: base-model
//! patterns must be resolved against the live catalog. While that lookup is
//! in flight the user may apply another preset. The coordinator guarantees
//! that only the most recently requested application ever reaches the live
//! selection:
//!
//! 1. `apply` cancels the outstanding request and issues a new ticket
//! 2. the preset body is read from the [`PresetStore`]
//! 3. patterns are resolved (the only `.await`); afterwards the ticket must
//!    still be current, otherwise the result is dropped without a report
//! 4. the resolved selection is committed, marked active, persisted, and the
//!    item list is reloaded
//!
//! The catalog call itself is never aborted; a superseded lookup simply runs
//! to completion and its result is ignored.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::latest_request::{LatestRequest, RequestTicket};
use super::preset_store::PresetStore;
use super::resolution::{is_no_match, BaseModelPatterns};
use crate::error::PresetError;
use crate::models::{ContextCapabilities, FilterState, Preset};
use crate::ports::{CatalogService, ItemReloader, Notifier, NotifyKind, PersistenceGateway};

/// Result of an [`PresetApplicationCoordinator::apply`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The preset was committed; carries the selection now live.
    Applied(FilterState),
    /// A newer request (or a cancellation) took over; nothing was changed.
    Superseded,
}

impl ApplyOutcome {
    /// Returns true if the preset reached the live selection.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// External services the coordinator talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Persistence for presets, the active marker and the live selection.
    pub gateway: Arc<dyn PersistenceGateway>,
    /// Source of available base-model labels.
    pub catalog: Arc<dyn CatalogService>,
    /// Item list to reload after a committed change.
    pub reloader: Arc<dyn ItemReloader>,
    /// User-facing notifications.
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Default)]
struct LiveSelection {
    filters: FilterState,
    active_preset: Option<String>,
}

/// Owns the live selection of one context and applies presets to it.
pub struct PresetApplicationCoordinator {
    context: String,
    capabilities: ContextCapabilities,
    store: Arc<PresetStore>,
    collaborators: Collaborators,
    live: Mutex<LiveSelection>,
    requests: LatestRequest,
}

impl PresetApplicationCoordinator {
    /// Creates a coordinator with an empty live selection.
    ///
    /// Call [`restore`](Self::restore) to load the persisted selection.
    pub fn new(
        capabilities: ContextCapabilities,
        store: Arc<PresetStore>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            context: store.context().to_string(),
            capabilities,
            store,
            collaborators,
            live: Mutex::new(LiveSelection::default()),
            requests: LatestRequest::new(),
        }
    }

    /// Context this coordinator manages.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Preset store backing this coordinator.
    #[must_use]
    pub fn store(&self) -> &Arc<PresetStore> {
        &self.store
    }

    /// Loads the persisted live selection and active marker.
    ///
    /// Unreadable or malformed data leaves the selection empty.
    pub fn restore(&self) {
        let gateway = &self.collaborators.gateway;

        let mut filters = match gateway.read_filters(&self.context) {
            Ok(Some(raw)) => FilterState::normalize(&raw),
            Ok(None) => FilterState::new(),
            Err(e) => {
                warn!(context = %self.context, error = %e, "failed to read filters");
                FilterState::new()
            }
        };
        self.capabilities.restrict(&mut filters);

        let active_preset = gateway
            .read_active_preset(&self.context)
            .unwrap_or_else(|e| {
                warn!(context = %self.context, error = %e, "failed to read active preset");
                None
            });

        debug!(
            context = %self.context,
            filters = filters.active_count(),
            active = active_preset.as_deref().unwrap_or("-"),
            "restored live selection"
        );

        let mut live = self.live.lock();
        live.filters = filters;
        live.active_preset = active_preset;
    }

    /// Snapshot of the live selection.
    #[must_use]
    pub fn filters(&self) -> FilterState {
        self.live.lock().filters.clone()
    }

    /// Name of the preset the live selection came from, if unchanged since.
    #[must_use]
    pub fn active_preset(&self) -> Option<String> {
        self.live.lock().active_preset.clone()
    }

    /// Returns true while a preset application is resolving.
    #[must_use]
    pub fn is_applying(&self) -> bool {
        self.requests.is_pending()
    }

    /// Applies a user change to the live selection.
    ///
    /// The change is committed immediately: the active preset marker is
    /// cleared, the selection is persisted and the item list reloads from
    /// the first page. An in-flight preset application is not cancelled;
    /// if it completes it still wins.
    pub fn update_filters<F, R>(&self, change: F) -> R
    where
        F: FnOnce(&mut FilterState) -> R,
    {
        let (result, filters) = {
            let mut live = self.live.lock();
            let result = change(&mut live.filters);
            self.capabilities.restrict(&mut live.filters);
            live.active_preset = None;
            (result, live.filters.clone())
        };

        debug!(
            context = %self.context,
            filters = filters.active_count(),
            "live selection updated"
        );
        self.persist(&filters, None);
        self.collaborators.reloader.reload(&self.context, true);
        result
    }

    /// Clears every filter of the live selection.
    pub fn clear_filters(&self) {
        self.update_filters(FilterState::clear);
    }

    /// Saves the live selection as a preset and marks it active.
    /// See [`PresetStore::create`].
    pub fn save_current(&self, name: &str, overwrite: bool) -> Result<Preset, PresetError> {
        let filters = self.filters();
        let preset = self.store.create(name, &filters, overwrite)?;

        self.live.lock().active_preset = Some(preset.name.clone());
        self.persist_active(Some(&preset.name));
        self.collaborators
            .notifier
            .notify(NotifyKind::Success, &format!("Saved preset '{}'", preset.name));
        Ok(preset)
    }

    /// Deletes a preset, clearing the active marker if it pointed at it.
    ///
    /// Returns false if no preset has that exact name.
    pub fn delete_preset(&self, name: &str) -> bool {
        if !self.store.delete(name) {
            return false;
        }

        let was_active = {
            let mut live = self.live.lock();
            let was_active = live.active_preset.as_deref() == Some(name);
            if was_active {
                live.active_preset = None;
            }
            was_active
        };
        if was_active {
            self.persist_active(None);
        }

        self.collaborators
            .notifier
            .notify(NotifyKind::Success, &format!("Deleted preset '{name}'"));
        true
    }

    /// Applies the named preset to the live selection.
    ///
    /// Returns [`ApplyOutcome::Superseded`] without reporting anything if a
    /// newer `apply` or [`cancel_active`](Self::cancel_active) took over
    /// while the catalog was being consulted.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::NotFound`] (also reported to the notifier) if
    /// the preset does not exist; the live selection is left untouched.
    pub async fn apply(&self, name: &str) -> Result<ApplyOutcome, PresetError> {
        let ticket = self.requests.issue();
        debug!(context = %self.context, request = ticket.id(), preset = name, "applying preset");

        let Some(preset) = self.store.get(name) else {
            self.requests.finish(&ticket);
            let err = PresetError::NotFound {
                name: name.to_string(),
            };
            self.collaborators
                .notifier
                .notify(NotifyKind::Error, &err.to_string());
            return Err(err);
        };

        let patterns = BaseModelPatterns::parse(preset.filters.base_model());
        let base_model = self.resolve(&preset.name, &patterns, &ticket).await;

        let Some(base_model) = base_model else {
            debug!(
                context = %self.context,
                request = ticket.id(),
                latest = self.requests.latest_id(),
                "preset application superseded"
            );
            return Ok(ApplyOutcome::Superseded);
        };

        let mut filters = preset.filters.clone();
        filters.set_base_model(base_model);
        self.capabilities.restrict(&mut filters);

        let committed = self.requests.commit_if_current(&ticket, || {
            let mut live = self.live.lock();
            live.filters = filters.clone();
            live.active_preset = Some(preset.name.clone());
        });
        if committed.is_none() {
            debug!(context = %self.context, request = ticket.id(), "superseded before commit");
            return Ok(ApplyOutcome::Superseded);
        }

        self.persist(&filters, Some(&preset.name));
        self.collaborators.reloader.reload(&self.context, true);
        self.collaborators
            .notifier
            .notify(NotifyKind::Success, &format!("Applied preset '{}'", preset.name));
        info!(
            context = %self.context,
            request = ticket.id(),
            preset = %preset.name,
            filters = filters.active_count(),
            "preset applied"
        );

        Ok(ApplyOutcome::Applied(filters))
    }

    /// Cancels the in-flight application, if any. Its result will be discarded.
    pub fn cancel_active(&self) -> bool {
        let cancelled = self.requests.cancel();
        if cancelled {
            debug!(context = %self.context, "preset application cancelled");
        }
        cancelled
    }

    /// Resolves base-model patterns. Returns `None` if the ticket was superseded.
    async fn resolve(
        &self,
        preset: &str,
        patterns: &BaseModelPatterns,
        ticket: &RequestTicket,
    ) -> Option<BTreeSet<String>> {
        if patterns.is_empty() {
            return self.requests.is_current(ticket).then(BTreeSet::new);
        }

        let lookup = self
            .collaborators
            .catalog
            .list_base_models(&self.context, ticket.token())
            .await;

        if !self.requests.is_current(ticket) {
            return None;
        }

        match lookup {
            Ok(entries) => Some(patterns.resolve(entries.iter().map(|e| e.label.as_str()))),
            Err(e) => {
                warn!(
                    context = %self.context,
                    preset,
                    error = %e,
                    "catalog lookup failed, using literal base models"
                );
                let fallback = patterns.fallback();
                if is_no_match(&fallback) {
                    let err = PresetError::ResolutionFailure {
                        name: preset.to_string(),
                        reason: format!("{e:#}"),
                    };
                    self.collaborators
                        .notifier
                        .notify(NotifyKind::Error, &err.to_string());
                }
                Some(fallback)
            }
        }
    }

    fn persist(&self, filters: &FilterState, active: Option<&str>) {
        if let Err(e) = self
            .collaborators
            .gateway
            .write_filters(&self.context, filters)
        {
            self.report_persistence("filters", &e);
        }
        self.persist_active(active);
    }

    fn persist_active(&self, active: Option<&str>) {
        if let Err(e) = self
            .collaborators
            .gateway
            .write_active_preset(&self.context, active)
        {
            self.report_persistence("active preset", &e);
        }
    }

    fn report_persistence(&self, what: &str, e: &anyhow::Error) {
        warn!(context = %self.context, error = %e, "failed to persist {what}");
        let err = PresetError::Persistence {
            what: format!("{what} for '{}'", self.context),
            reason: format!("{e:#}"),
        };
        self.collaborators
            .notifier
            .notify(NotifyKind::Error, &err.to_string());
    }
}

impl std::fmt::Debug for PresetApplicationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetApplicationCoordinator")
            .field("context", &self.context)
            .field("capabilities", &self.capabilities)
            .field("live", &*self.live.lock())
            .finish_non_exhaustive()
    }
}
