//! Error types for preset management and application.

use thiserror::Error;

/// Reasons a preset name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Name is empty or contains only whitespace.
    #[error("preset name cannot be empty")]
    Empty,

    /// Name exceeds the maximum length.
    #[error("preset name is too long ({len} characters, maximum is {max})")]
    TooLong { len: usize, max: usize },

    /// Name contains one of `< > ' &`.
    #[error("preset name cannot contain '{0}'")]
    ForbiddenChar(char),

    /// Name contains a control character.
    #[error("preset name cannot contain control character U+{0:04X}")]
    ControlChar(u32),
}

/// Errors surfaced by the preset store and the application coordinator.
///
/// Supersession of an in-flight application is not an error; it is reported
/// as [`ApplyOutcome::Superseded`](crate::services::ApplyOutcome::Superseded).
#[derive(Debug, Error)]
pub enum PresetError {
    /// The preset name failed validation.
    #[error("invalid preset name: {0}")]
    Validation(#[from] NameError),

    /// A preset with the same name (ignoring case) already exists.
    #[error("a preset named '{existing}' already exists")]
    DuplicateName { existing: String },

    /// The context already holds the maximum number of presets.
    #[error("preset limit reached ({limit} presets per context)")]
    CapacityExceeded { limit: usize },

    /// No preset with the requested name exists.
    #[error("preset '{name}' not found")]
    NotFound { name: String },

    /// A preset cannot be saved from an empty selection.
    #[error("no active filters to save")]
    NoActiveFilters,

    /// Base-model patterns could not be resolved against the catalog.
    #[error("could not resolve base models for preset '{name}': {reason}")]
    ResolutionFailure { name: String, reason: String },

    /// The persistence gateway rejected a write.
    #[error("failed to persist {what}: {reason}")]
    Persistence { what: String, reason: String },
}

impl PresetError {
    /// Returns true if the caller may retry the same request with `overwrite = true`.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }
}
