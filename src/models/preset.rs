//! Named filter snapshots and the per-context collection that holds them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{FORBIDDEN_NAME_CHARS, MAX_PRESETS_PER_CONTEXT, MAX_PRESET_NAME_LEN};
use crate::error::NameError;
use crate::models::FilterState;

/// A named snapshot of a filter selection.
///
/// `filters` is an independent copy: later changes to the live selection
/// never reach a stored preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    /// Display name, unique (ignoring case) within its context.
    pub name: String,
    /// Snapshot of the selection at save time.
    pub filters: FilterState,
    /// Creation time. Informational only.
    pub created_at: DateTime<Utc>,
}

impl Preset {
    /// Creates a preset from a snapshot of `filters`, stamped with the current time.
    pub fn new(name: impl Into<String>, filters: &FilterState) -> Self {
        Self {
            name: name.into(),
            filters: filters.clone(),
            created_at: Utc::now(),
        }
    }

    /// Parses one stored entry, returning `None` if it is malformed.
    ///
    /// An entry is usable when `name` is a non-empty string and `filters` is
    /// an object. A missing or unreadable `createdAt` falls back to the epoch.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let name = raw.get("name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }

        let filters = raw.get("filters").filter(|f| f.is_object())?;

        let created_at = raw
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map_or(DateTime::<Utc>::UNIX_EPOCH, |dt| dt.with_timezone(&Utc));

        Some(Self {
            name: name.to_string(),
            filters: FilterState::normalize(filters),
            created_at,
        })
    }
}

/// Validates a preset name after trimming surrounding whitespace.
///
/// Rejects names that are blank, longer than [`MAX_PRESET_NAME_LEN`]
/// characters, contain any of `< > ' &`, or contain a control character
/// (U+0000–U+001F, U+007F–U+009F).
pub fn validate_preset_name(name: &str) -> Result<(), NameError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    let len = name.chars().count();
    if len > MAX_PRESET_NAME_LEN {
        return Err(NameError::TooLong {
            len,
            max: MAX_PRESET_NAME_LEN,
        });
    }

    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(NameError::ForbiddenChar(c));
    }

    if let Some(c) = name.chars().find(|c| is_control(*c)) {
        return Err(NameError::ControlChar(u32::from(c)));
    }

    Ok(())
}

const fn is_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}

/// Ordered presets of one context. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PresetCollection {
    presets: Vec<Preset>,
}

impl PresetCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from a stored value, silently dropping malformed entries.
    ///
    /// Anything other than an array yields an empty collection.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Self {
        let presets = raw
            .as_array()
            .map(|entries| entries.iter().filter_map(Preset::from_raw).collect())
            .unwrap_or_default();
        Self { presets }
    }

    /// Number of presets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Returns true if there are no presets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Returns true if no further preset can be added.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.presets.len() >= MAX_PRESETS_PER_CONTEXT
    }

    /// Iterates presets in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Preset> {
        self.presets.iter()
    }

    /// Finds a preset by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Position of the preset whose name equals `name` ignoring case.
    #[must_use]
    pub fn position_ignore_case(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.presets
            .iter()
            .position(|p| p.name.to_lowercase() == wanted)
    }

    /// Appends a preset at the end.
    pub(crate) fn push(&mut self, preset: Preset) {
        self.presets.push(preset);
    }

    /// Replaces the preset at `index`, keeping its display position.
    pub(crate) fn replace(&mut self, index: usize, preset: Preset) {
        self.presets[index] = preset;
    }

    /// Removes the preset with exactly this name. Returns true if one was removed.
    pub(crate) fn remove(&mut self, name: &str) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.name != name);
        self.presets.len() != before
    }

    /// Presets as a slice, in display order.
    #[must_use]
    pub fn as_slice(&self) -> &[Preset] {
        &self.presets
    }
}

impl<'a> IntoIterator for &'a PresetCollection {
    type Item = &'a Preset;
    type IntoIter = std::slice::Iter<'a, Preset>;

    fn into_iter(self) -> Self::IntoIter {
        self.presets.iter()
    }
}
