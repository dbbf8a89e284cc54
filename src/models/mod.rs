//! Data models for filter selections and presets.
//!
//! Models are independent of persistence and of the asynchronous
//! application flow; they only enforce their own invariants.

pub mod context;
pub mod filter_state;
pub mod preset;

pub use context::ContextCapabilities;
pub use filter_state::{FilterState, ItemFacets, TriState};
pub use preset::{validate_preset_name, Preset, PresetCollection};
