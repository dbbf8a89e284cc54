//! Tri-state filter selection for one browsing context.
//!
//! A [`FilterState`] is the canonical in-memory shape of a filter selection.
//! Persisted values (which may use older layouts) are converted once through
//! [`FilterState::normalize`] and never threaded through the rest of the code.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::NO_TAGS_TAG;

/// Per-key filter state: neutral, include or exclude.
///
/// Keys cycle `Neutral -> Include -> Exclude -> Neutral`. Neutral is never
/// stored in a [`FilterState`]; it is represented by the key being absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    /// No constraint.
    #[default]
    Neutral,
    /// Item must carry the key.
    Include,
    /// Item must not carry the key.
    Exclude,
}

impl TriState {
    /// Returns the next state in the toggle cycle.
    #[must_use]
    pub const fn advance(self) -> Self {
        match self {
            Self::Neutral => Self::Include,
            Self::Include => Self::Exclude,
            Self::Exclude => Self::Neutral,
        }
    }

    /// Parses a stored state. Only `"include"` and `"exclude"` are accepted.
    #[must_use]
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "include" => Some(Self::Include),
            "exclude" => Some(Self::Exclude),
            _ => None,
        }
    }

    /// Returns the lowercase name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Include => "include",
            Self::Exclude => "exclude",
        }
    }
}

impl std::fmt::Display for TriState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facets of a single item, used to evaluate a selection against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFacets {
    /// Base model label of the item.
    pub base_model: String,
    /// Tags attached to the item (may be empty).
    pub tags: Vec<String>,
    /// License keys granted by the item.
    pub licenses: Vec<String>,
    /// Model type key of the item (compared case-insensitively).
    pub model_type: String,
}

/// Multi-dimensional filter selection.
///
/// # Invariants
///
/// - All four containers always exist (possibly empty)
/// - `tags` and `license` only ever hold `Include` or `Exclude`
/// - `model_types` is stored lower-case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct FilterState {
    base_model: BTreeSet<String>,
    tags: BTreeMap<String, TriState>,
    license: BTreeMap<String, TriState>,
    model_types: BTreeSet<String>,
}

impl FilterState {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the tri-state cycle for a tag and returns the new state.
    pub fn toggle_tag(&mut self, name: &str) -> TriState {
        cycle(&mut self.tags, name)
    }

    /// Advances the tri-state cycle for a license key and returns the new state.
    pub fn toggle_license(&mut self, key: &str) -> TriState {
        cycle(&mut self.license, key)
    }

    /// Toggles base-model membership. Returns true if the label is now selected.
    pub fn toggle_base_model(&mut self, label: &str) -> bool {
        toggle_member(&mut self.base_model, label.to_string())
    }

    /// Toggles model-type membership. Returns true if the type is now selected.
    pub fn toggle_model_type(&mut self, key: &str) -> bool {
        toggle_member(&mut self.model_types, key.to_lowercase())
    }

    /// Current state of a tag.
    #[must_use]
    pub fn tag_state(&self, name: &str) -> TriState {
        self.tags.get(name).copied().unwrap_or_default()
    }

    /// Current state of a license key.
    #[must_use]
    pub fn license_state(&self, key: &str) -> TriState {
        self.license.get(key).copied().unwrap_or_default()
    }

    /// Selected base-model labels (or patterns, inside a stored preset).
    #[must_use]
    pub const fn base_model(&self) -> &BTreeSet<String> {
        &self.base_model
    }

    /// Active tag constraints.
    #[must_use]
    pub const fn tags(&self) -> &BTreeMap<String, TriState> {
        &self.tags
    }

    /// Active license constraints.
    #[must_use]
    pub const fn license(&self) -> &BTreeMap<String, TriState> {
        &self.license
    }

    /// Selected model types.
    #[must_use]
    pub const fn model_types(&self) -> &BTreeSet<String> {
        &self.model_types
    }

    /// Replaces the base-model selection.
    pub fn set_base_model<I>(&mut self, labels: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.base_model = labels.into_iter().collect();
    }

    /// Drops every license constraint.
    pub fn clear_license(&mut self) {
        self.license.clear();
    }

    /// Resets the selection to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of active constraints across all four dimensions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.base_model.len() + self.tags.len() + self.license.len() + self.model_types.len()
    }

    /// Returns true if at least one constraint is active.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.active_count() > 0
    }

    /// Short label for an "N filters active" indicator.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.active_count() {
            0 => "No filters active".to_string(),
            1 => "1 filter active".to_string(),
            n => format!("{n} filters active"),
        }
    }

    /// Rebuilds a selection from an arbitrary persisted value.
    ///
    /// Accepts tags either as a mapping (`{"tag": "include"}`) or as the
    /// legacy array of names, which are all treated as included. Entries
    /// whose state is not exactly `"include"` or `"exclude"` are dropped.
    /// Anything that is not an object yields an empty selection.
    #[must_use]
    pub fn normalize(raw: &Value) -> Self {
        let Some(obj) = raw.as_object() else {
            return Self::default();
        };

        Self {
            base_model: string_set(obj.get("baseModel")),
            tags: tri_state_map(obj.get("tags")),
            license: tri_state_map(obj.get("license")),
            model_types: string_set(obj.get("modelTypes"))
                .into_iter()
                .map(|key| key.to_lowercase())
                .collect(),
        }
    }

    /// Evaluates the selection against one item.
    ///
    /// - base models and model types: item must match one selected entry
    /// - tags: excluded tags veto; if any tag is included the item must carry
    ///   at least one of them ([`NO_TAGS_TAG`] matches untagged items)
    /// - licenses: every included key is required, excluded keys veto
    #[must_use]
    pub fn matches(&self, item: &ItemFacets) -> bool {
        if !self.base_model.is_empty() && !self.base_model.contains(&item.base_model) {
            return false;
        }

        if !self.model_types.is_empty()
            && !self.model_types.contains(&item.model_type.to_lowercase())
        {
            return false;
        }

        self.tags_match(item) && self.license_matches(item)
    }

    fn tags_match(&self, item: &ItemFacets) -> bool {
        let has_tag = |tag: &str| {
            if tag == NO_TAGS_TAG {
                item.tags.is_empty()
            } else {
                item.tags.iter().any(|t| t == tag)
            }
        };

        let mut wants_include = false;
        let mut included = false;
        for (tag, state) in &self.tags {
            match state {
                TriState::Exclude if has_tag(tag) => return false,
                TriState::Include => {
                    wants_include = true;
                    included |= has_tag(tag);
                }
                _ => {}
            }
        }

        !wants_include || included
    }

    fn license_matches(&self, item: &ItemFacets) -> bool {
        self.license.iter().all(|(key, state)| {
            let granted = item.licenses.iter().any(|l| l == key);
            match state {
                TriState::Include => granted,
                TriState::Exclude => !granted,
                TriState::Neutral => true,
            }
        })
    }
}

impl From<Value> for FilterState {
    fn from(raw: Value) -> Self {
        Self::normalize(&raw)
    }
}

fn cycle(map: &mut BTreeMap<String, TriState>, key: &str) -> TriState {
    let next = map.get(key).copied().unwrap_or_default().advance();
    if next == TriState::Neutral {
        map.remove(key);
    } else {
        map.insert(key.to_string(), next);
    }
    next
}

fn toggle_member(set: &mut BTreeSet<String>, key: String) -> bool {
    if set.remove(&key) {
        false
    } else {
        set.insert(key);
        true
    }
}

fn string_set(raw: Option<&Value>) -> BTreeSet<String> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn tri_state_map(raw: Option<&Value>) -> BTreeMap<String, TriState> {
    match raw {
        // Legacy layout: plain list of included names
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|name| (name.to_string(), TriState::Include))
            .collect(),
        Some(Value::Object(entries)) => entries
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .filter_map(|(key, state)| {
                let state = state.as_str().and_then(TriState::from_stored)?;
                Some((key.clone(), state))
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}
