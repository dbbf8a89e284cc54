//! Application-wide constants.
//!
//! Limits and reserved identifiers shared by the filter model, the preset
//! store and the application coordinator.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Filter Presets";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "filter-presets";

/// Directory name used under the platform config directory.
pub const APP_DIR_NAME: &str = "FilterPresets";

/// Environment variable that overrides the config directory (used by tests and scripts).
pub const CONFIG_DIR_ENV: &str = "FILTER_PRESETS_CONFIG_DIR";

/// Maximum number of presets stored per context.
pub const MAX_PRESETS_PER_CONTEXT: usize = 10;

/// Maximum preset name length, in characters.
pub const MAX_PRESET_NAME_LEN: usize = 30;

/// Characters that may never appear in a preset name.
pub const FORBIDDEN_NAME_CHARS: &[char] = &['<', '>', '\'', '&'];

/// Reserved tag name selecting items that carry no tags at all.
pub const NO_TAGS_TAG: &str = "__no_tags__";

/// Reserved base-model label produced when wildcard patterns matched nothing.
///
/// No catalog label ever equals this value, so a base-model selection holding
/// only the sentinel matches zero items instead of meaning "no constraint".
pub const NO_MATCH_SENTINEL: &str = "__no_match__";

/// Suffix marking a base-model pattern as a prefix wildcard.
pub const WILDCARD_SUFFIX: char = '*';
