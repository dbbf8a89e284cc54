//! Preset CRUD for one browsing context.
//!
//! The store keeps an in-memory copy of the context's collection and writes
//! the whole collection through the [`PersistenceGateway`] after every
//! change. The in-memory copy is updated first, so a failed write is reported
//! but the session keeps working with the new state.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::constants::MAX_PRESETS_PER_CONTEXT;
use crate::error::PresetError;
use crate::models::{validate_preset_name, FilterState, Preset, PresetCollection};
use crate::ports::{Notifier, NotifyKind, PersistenceGateway};

/// Named filter snapshots of a single context.
pub struct PresetStore {
    context: String,
    gateway: Arc<dyn PersistenceGateway>,
    notifier: Arc<dyn Notifier>,
    cache: Mutex<Option<PresetCollection>>,
}

impl PresetStore {
    /// Creates a store for `context`. Nothing is read until first use.
    pub fn new(
        context: impl Into<String>,
        gateway: Arc<dyn PersistenceGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            context: context.into(),
            gateway,
            notifier,
            cache: Mutex::new(None),
        }
    }

    /// Context this store belongs to.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Returns the context's presets in display order.
    ///
    /// Malformed stored entries are dropped; an unreadable store yields an
    /// empty collection.
    pub fn list(&self) -> PresetCollection {
        self.cache.lock().get_or_insert_with(|| self.load()).clone()
    }

    /// Looks up a preset by exact name.
    pub fn get(&self, name: &str) -> Option<Preset> {
        self.cache
            .lock()
            .get_or_insert_with(|| self.load())
            .get(name)
            .cloned()
    }

    /// Saves a snapshot of `state` under `name`.
    ///
    /// # Errors
    ///
    /// - [`PresetError::Validation`] if the name is invalid
    /// - [`PresetError::NoActiveFilters`] if `state` has no active filter
    /// - [`PresetError::DuplicateName`] if the name exists (ignoring case)
    ///   and `overwrite` is false; retry with `overwrite = true` to replace it
    /// - [`PresetError::CapacityExceeded`] if the context is full
    pub fn create(
        &self,
        name: &str,
        state: &FilterState,
        overwrite: bool,
    ) -> Result<Preset, PresetError> {
        let name = name.trim();
        validate_preset_name(name)?;
        if !state.has_active() {
            return Err(PresetError::NoActiveFilters);
        }

        let mut collection = self.list();
        let preset = Preset::new(name, state);

        match collection.position_ignore_case(name) {
            Some(index) if !overwrite => {
                return Err(PresetError::DuplicateName {
                    existing: collection.as_slice()[index].name.clone(),
                });
            }
            Some(index) => {
                debug!(context = %self.context, preset = name, "overwriting preset");
                collection.replace(index, preset.clone());
            }
            None if collection.is_full() => {
                return Err(PresetError::CapacityExceeded {
                    limit: MAX_PRESETS_PER_CONTEXT,
                });
            }
            None => collection.push(preset.clone()),
        }

        self.commit(collection);
        info!(
            context = %self.context,
            preset = name,
            filters = state.active_count(),
            "preset saved"
        );
        Ok(preset)
    }

    /// Deletes the preset with exactly this name. Returns true if it existed.
    ///
    /// Deleting the last preset removes the context's entry from storage.
    pub fn delete(&self, name: &str) -> bool {
        let mut collection = self.list();
        if !collection.remove(name) {
            return false;
        }

        self.commit(collection);
        info!(context = %self.context, preset = name, "preset deleted");
        true
    }

    /// Replaces the context's collection in memory and in storage.
    ///
    /// An empty collection removes the context entry instead of storing an
    /// empty list. The in-memory copy is updated even if the write fails.
    ///
    /// # Errors
    ///
    /// Returns [`PresetError::Persistence`] if the gateway rejected the write.
    pub fn save(&self, collection: PresetCollection) -> Result<(), PresetError> {
        let result = if collection.is_empty() {
            self.gateway.remove_presets(&self.context)
        } else {
            self.gateway.write_presets(&self.context, &collection)
        };

        *self.cache.lock() = Some(collection);

        result.map_err(|e| {
            warn!(context = %self.context, error = %e, "failed to persist presets");
            PresetError::Persistence {
                what: format!("presets for '{}'", self.context),
                reason: format!("{e:#}"),
            }
        })
    }

    fn commit(&self, collection: PresetCollection) {
        if let Err(e) = self.save(collection) {
            self.notifier.notify(NotifyKind::Error, &e.to_string());
        }
    }

    fn load(&self) -> PresetCollection {
        let raw = match self.gateway.read_presets(&self.context) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PresetCollection::new(),
            Err(e) => {
                warn!(context = %self.context, error = %e, "failed to read presets");
                return PresetCollection::new();
            }
        };

        let collection = PresetCollection::from_raw(&raw);
        let stored = raw.as_array().map_or(0, Vec::len);
        if stored != collection.len() {
            warn!(
                context = %self.context,
                dropped = stored - collection.len(),
                "dropped malformed preset entries"
            );
        }
        collection
    }
}

impl std::fmt::Debug for PresetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetStore")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TracingNotifier;
    use crate::storage::MemoryGateway;
    use serde_json::json;

    fn store_with(gateway: &Arc<MemoryGateway>) -> PresetStore {
        PresetStore::new("models", gateway.clone(), Arc::new(TracingNotifier))
    }

    fn selection() -> FilterState {
        let mut state = FilterState::new();
        state.toggle_tag("anime");
        state
    }

    #[test]
    fn test_create_and_list_in_insertion_order() {
        let gateway = Arc::new(MemoryGateway::new());
        let store = store_with(&gateway);

        store.create("Zeta", &selection(), false).unwrap();
        store.create("Alpha", &selection(), false).unwrap();

        let names: Vec<_> = store.list().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert!(gateway.has_presets("models"));
    }

    #[test]
    fn test_create_trims_name() {
        let gateway = Arc::new(MemoryGateway::new());
        let store = store_with(&gateway);
        let preset = store.create("  Padded  ", &selection(), false).unwrap();
        assert_eq!(preset.name, "Padded");
    }

    #[test]
    fn test_create_rejects_empty_selection() {
        let gateway = Arc::new(MemoryGateway::new());
        let store = store_with(&gateway);
        let err = store.create("Nothing", &FilterState::new(), false).unwrap_err();
        assert!(matches!(err, PresetError::NoActiveFilters));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let gateway = Arc::new(MemoryGateway::new());
        let store = store_with(&gateway);
        store.create("First", &selection(), false).unwrap();
        store.create("Second", &selection(), false).unwrap();

        let mut changed = selection();
        changed.toggle_base_model("sdxl");
        store.create("FIRST", &changed, true).unwrap();

        let list = store.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list.as_slice()[0].name, "FIRST");
        assert_eq!(list.as_slice()[0].filters.active_count(), 2);
        assert_eq!(list.as_slice()[1].name, "Second");
    }

    #[test]
    fn test_list_reads_through_gateway_once() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.seed_presets(
            "models",
            json!([{"name": "Stored", "filters": {"tags": ["a"]}}, {"name": ""}]),
        );
        let store = store_with(&gateway);

        let list = store.list();
        assert_eq!(list.len(), 1);
        assert!(store.get("Stored").is_some());

        // Later gateway changes are not observed; the cache is authoritative
        gateway.seed_presets("models", json!([]));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let gateway = Arc::new(MemoryGateway::new());
        let store = store_with(&gateway);
        store.create("Keep", &selection(), false).unwrap();
        let writes = gateway.write_count();

        assert!(!store.delete("keep"));
        assert_eq!(gateway.write_count(), writes);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_save_failure_keeps_memory_state() {
        let gateway = Arc::new(MemoryGateway::new());
        let store = store_with(&gateway);
        gateway.set_fail_writes(true);

        let mut collection = PresetCollection::new();
        collection.push(Preset::new("Offline", &selection()));
        let err = store.save(collection).unwrap_err();

        assert!(matches!(err, PresetError::Persistence { .. }));
        assert!(store.get("Offline").is_some());
        assert!(!gateway.has_presets("models"));
    }
}
