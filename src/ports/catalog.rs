//! Fixed catalog backed by a list or a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{CatalogEntry, CatalogService};

/// Catalog service returning the same entries for every context.
///
/// Used by the CLI (loaded from a JSON array of `{label, count}` objects)
/// and by hosts that already hold the full catalog in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    /// Creates a catalog from entries.
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Creates a catalog from bare labels, each with a count of zero.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: labels
                .into_iter()
                .map(|label| CatalogEntry::new(label, 0))
                .collect(),
        }
    }

    /// Loads a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;
        Ok(Self { entries })
    }

    /// Entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

#[async_trait]
impl CatalogService for StaticCatalog {
    async fn list_base_models(
        &self,
        context: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogEntry>> {
        if cancel.is_cancelled() {
            anyhow::bail!("catalog lookup for '{context}' cancelled");
        }
        debug!(context, entries = self.entries.len(), "serving static catalog");
        Ok(self.entries.clone())
    }
}
