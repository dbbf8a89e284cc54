//! Filter Presets Library
//!
//! Filter selection and preset coordination for browsing views. Users pick
//! tri-state tag and license filters plus base-model and model-type sets,
//! save them as named presets per context, and apply presets back to the
//! live selection. Base-model entries of a preset may be prefix wildcards
//! (`SDXL*`) that are resolved against a catalog when the preset is applied.
//! Only the most recently requested application ever reaches the live
//! selection.
//!
//! The main entry points are [`services::PresetStore`] and
//! [`services::PresetApplicationCoordinator`]; the traits in [`ports`]
//! connect them to storage, catalog, item list and notifications.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod ports;
pub mod services;
pub mod storage;

pub use error::{NameError, PresetError};
