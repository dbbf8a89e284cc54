//! Shared CLI types: error/exit-code mapping and engine wiring.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::PresetError;
use crate::ports::{CatalogEntry, CatalogService, ConsoleNotifier, StaticCatalog, TracingReloader};
use crate::services::{Collaborators, PresetApplicationCoordinator, PresetStore};
use crate::storage::JsonFileGateway;

/// Process exit codes used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded.
    Success = 0,
    /// Invalid input (bad name, unknown preset, empty selection).
    Validation = 1,
    /// File or configuration problem.
    Io = 2,
    /// Name collision or full collection.
    Conflict = 3,
}

/// Error returned by CLI commands.
#[derive(Debug, Clone)]
pub struct CliError {
    /// Exit code for the process.
    pub code: ExitCode,
    /// Message printed to stderr.
    pub message: String,
}

impl CliError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Validation,
            message: message.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Io,
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: ExitCode::Conflict,
            message: message.into(),
        }
    }

    /// Error already shown to the user through the notifier; only sets the exit code.
    pub const fn reported(code: ExitCode) -> Self {
        Self {
            code,
            message: String::new(),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<PresetError> for CliError {
    fn from(err: PresetError) -> Self {
        match err {
            PresetError::DuplicateName { .. } => {
                Self::conflict(format!("{err} (use --overwrite to replace it)"))
            }
            PresetError::CapacityExceeded { .. } => Self::conflict(err.to_string()),
            PresetError::Persistence { .. } | PresetError::ResolutionFailure { .. } => {
                Self::io(err.to_string())
            }
            PresetError::Validation(_)
            | PresetError::NotFound { .. }
            | PresetError::NoActiveFilters => Self::validation(err.to_string()),
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Browsing context to operate on
    #[arg(short, long, global = true, default_value = "models", value_name = "NAME")]
    pub context: String,

    /// Data directory (overrides the configured one)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Base-model catalog JSON file (overrides the configured one)
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Builds a coordinator for the selected context and restores its live selection.
    pub fn open(&self, config: &Config) -> CliResult<PresetApplicationCoordinator> {
        if self.context.trim().is_empty() {
            return Err(CliError::validation("Context name cannot be empty"));
        }

        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => config
                .data_dir()
                .map_err(|e| CliError::io(format!("Failed to resolve data directory: {e}")))?,
        };

        let catalog: Arc<dyn CatalogService> =
            match self.catalog.as_ref().or(config.paths.catalog_file.as_ref()) {
                Some(path) => Arc::new(
                    StaticCatalog::load(path)
                        .map_err(|e| CliError::io(format!("Failed to load catalog: {e:#}")))?,
                ),
                None => Arc::new(NoCatalog),
            };

        let collaborators = Collaborators {
            gateway: Arc::new(JsonFileGateway::new(data_dir)),
            catalog,
            reloader: Arc::new(TracingReloader),
            notifier: Arc::new(ConsoleNotifier { quiet: self.json }),
        };

        let store = Arc::new(PresetStore::new(
            self.context.clone(),
            collaborators.gateway.clone(),
            collaborators.notifier.clone(),
        ));
        let coordinator = PresetApplicationCoordinator::new(
            config.capabilities(&self.context),
            store,
            collaborators,
        );
        coordinator.restore();
        Ok(coordinator)
    }
}

/// Stand-in when no catalog is configured: every lookup fails, so presets
/// fall back to their literal base models.
struct NoCatalog;

#[async_trait]
impl CatalogService for NoCatalog {
    async fn list_base_models(
        &self,
        context: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CatalogEntry>> {
        anyhow::bail!("no catalog configured for '{context}'")
    }
}

/// Serializes a value as compact JSON for `--json` output.
pub fn to_json<T: serde::Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string(value).map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))
}
