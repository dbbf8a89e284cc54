//! CLI command handlers for Filter Presets.
//!
//! Scriptable access to presets and the live filter selection of each
//! browsing context.

pub mod common;
pub mod config;
pub mod filter;
pub mod preset;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode, GlobalArgs};
pub use config::ConfigArgs;
pub use filter::FilterArgs;
pub use preset::PresetArgs;
