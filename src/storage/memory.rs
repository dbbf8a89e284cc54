//! In-process persistence gateway.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::Value;

use crate::models::{FilterState, PresetCollection};
use crate::ports::PersistenceGateway;

#[derive(Debug, Default)]
struct Tables {
    presets: HashMap<String, Value>,
    active: HashMap<String, String>,
    filters: HashMap<String, Value>,
}

/// Gateway keeping everything in memory.
///
/// Values are stored in their serialized form so reads exercise the same
/// normalization path as on-disk data. Writes can be made to fail with
/// [`MemoryGateway::set_fail_writes`].
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stores a raw preset value for a context, bypassing validation.
    pub fn seed_presets(&self, context: &str, raw: Value) {
        self.tables.lock().presets.insert(context.to_string(), raw);
    }

    /// Stores a raw filter value for a context, bypassing validation.
    pub fn seed_filters(&self, context: &str, raw: Value) {
        self.tables.lock().filters.insert(context.to_string(), raw);
    }

    /// Returns true if a preset entry exists for the context.
    #[must_use]
    pub fn has_presets(&self, context: &str) -> bool {
        self.tables.lock().presets.contains_key(context)
    }

    fn write<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Tables) -> Result<()>,
    {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("storage unavailable");
        }
        f(&mut self.tables.lock())?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl PersistenceGateway for MemoryGateway {
    fn read_presets(&self, context: &str) -> Result<Option<Value>> {
        Ok(self.tables.lock().presets.get(context).cloned())
    }

    fn write_presets(&self, context: &str, presets: &PresetCollection) -> Result<()> {
        let value = serde_json::to_value(presets).context("Failed to serialize presets")?;
        self.write(|t| {
            t.presets.insert(context.to_string(), value);
            Ok(())
        })
    }

    fn remove_presets(&self, context: &str) -> Result<()> {
        self.write(|t| {
            t.presets.remove(context);
            Ok(())
        })
    }

    fn read_active_preset(&self, context: &str) -> Result<Option<String>> {
        Ok(self.tables.lock().active.get(context).cloned())
    }

    fn write_active_preset(&self, context: &str, name: Option<&str>) -> Result<()> {
        self.write(|t| {
            match name {
                Some(name) => t.active.insert(context.to_string(), name.to_string()),
                None => t.active.remove(context),
            };
            Ok(())
        })
    }

    fn read_filters(&self, context: &str) -> Result<Option<Value>> {
        Ok(self.tables.lock().filters.get(context).cloned())
    }

    fn write_filters(&self, context: &str, filters: &FilterState) -> Result<()> {
        let value = serde_json::to_value(filters).context("Failed to serialize filters")?;
        self.write(|t| {
            t.filters.insert(context.to_string(), value);
            Ok(())
        })
    }
}
