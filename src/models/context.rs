//! Per-context capabilities.

use serde::{Deserialize, Serialize};

use crate::models::FilterState;

/// Capability flags of a browsing context.
///
/// Contexts whose items carry no license information disable the license
/// dimension entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCapabilities {
    /// Whether the license dimension is available in this context.
    #[serde(default = "default_true")]
    pub license_filter: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for ContextCapabilities {
    fn default() -> Self {
        Self {
            license_filter: true,
        }
    }
}

impl ContextCapabilities {
    /// Capabilities for a context without license filtering.
    #[must_use]
    pub const fn without_license() -> Self {
        Self {
            license_filter: false,
        }
    }

    /// Drops every dimension this context does not support.
    pub fn restrict(&self, filters: &mut FilterState) {
        if !self.license_filter {
            filters.clear_license();
        }
    }
}
