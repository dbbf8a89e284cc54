//! Preset management commands.
//!
//! Provides commands to list, create, delete and apply presets of a context.

use crate::cli::common::{to_json, CliError, CliResult, ExitCode, GlobalArgs};
use crate::config::Config;
use crate::error::PresetError;
use crate::models::{FilterState, Preset};
use crate::services::ApplyOutcome;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

/// Manage presets of a context
#[derive(Debug, Clone, Args)]
pub struct PresetArgs {
    /// Preset subcommand
    #[command(subcommand)]
    pub command: PresetCommand,
}

/// Preset management subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum PresetCommand {
    /// List presets of the context
    List,
    /// Save the current filter selection as a preset
    Create(CreatePresetArgs),
    /// Delete a preset
    Delete(NamedPresetArgs),
    /// Apply a preset to the current filter selection
    Apply(NamedPresetArgs),
}

/// Save the current filter selection as a preset
#[derive(Debug, Clone, Args)]
pub struct CreatePresetArgs {
    /// Preset name (1-30 characters)
    #[arg(long, value_name = "NAME")]
    pub name: String,

    /// Replace an existing preset with the same name
    #[arg(long)]
    pub overwrite: bool,
}

/// Select a preset by name
#[derive(Debug, Clone, Args)]
pub struct NamedPresetArgs {
    /// Preset name
    #[arg(long, value_name = "NAME")]
    pub name: String,
}

// JSON response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresetItem {
    name: String,
    active: bool,
    active_count: usize,
    created_at: DateTime<Utc>,
    filters: FilterState,
}

#[derive(Debug, Serialize)]
struct ListPresetsResponse {
    context: String,
    presets: Vec<PresetItem>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct CreateResponse {
    context: String,
    preset: String,
    overwritten: bool,
    filters: FilterState,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    context: String,
    preset: String,
    deleted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyResponse {
    context: String,
    preset: String,
    applied: bool,
    filters: Option<FilterState>,
}

impl PresetArgs {
    /// Execute the preset command
    pub async fn execute(&self, global: &GlobalArgs, config: &Config) -> CliResult<()> {
        match &self.command {
            PresetCommand::List => list(global, config),
            PresetCommand::Create(args) => args.execute(global, config),
            PresetCommand::Delete(args) => delete(args, global, config),
            PresetCommand::Apply(args) => apply(args, global, config).await,
        }
    }
}

fn list(global: &GlobalArgs, config: &Config) -> CliResult<()> {
    let coordinator = global.open(config)?;
    let active = coordinator.active_preset();
    let presets = coordinator.store().list();

    let items: Vec<PresetItem> = presets
        .iter()
        .map(|preset: &Preset| PresetItem {
            name: preset.name.clone(),
            active: active.as_deref() == Some(preset.name.as_str()),
            active_count: preset.filters.active_count(),
            created_at: preset.created_at,
            filters: preset.filters.clone(),
        })
        .collect();

    let response = ListPresetsResponse {
        context: global.context.clone(),
        count: items.len(),
        presets: items,
    };

    if global.json {
        println!("{}", to_json(&response)?);
    } else if response.count == 0 {
        println!("No presets saved for '{}'.", response.context);
    } else {
        println!("Presets for '{}' ({}):", response.context, response.count);
        println!();
        for item in response.presets {
            let marker = if item.active { "*" } else { " " };
            println!(
                "{} {:<30} {:>3} filters  {}",
                marker,
                item.name,
                item.active_count,
                item.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}

impl CreatePresetArgs {
    /// Execute the create command
    pub fn execute(&self, global: &GlobalArgs, config: &Config) -> CliResult<()> {
        let coordinator = global.open(config)?;
        let overwritten = coordinator
            .store()
            .list()
            .position_ignore_case(self.name.trim())
            .is_some();
        let preset = coordinator.save_current(&self.name, self.overwrite)?;

        if global.json {
            let response = CreateResponse {
                context: global.context.clone(),
                preset: preset.name,
                overwritten,
                filters: preset.filters,
            };
            println!("{}", to_json(&response)?);
        }
        Ok(())
    }
}

fn delete(args: &NamedPresetArgs, global: &GlobalArgs, config: &Config) -> CliResult<()> {
    let coordinator = global.open(config)?;
    if !coordinator.delete_preset(&args.name) {
        return Err(CliError::validation(format!(
            "Preset '{}' not found",
            args.name
        )));
    }

    if global.json {
        let response = DeleteResponse {
            context: global.context.clone(),
            preset: args.name.clone(),
            deleted: true,
        };
        println!("{}", to_json(&response)?);
    }
    Ok(())
}

async fn apply(args: &NamedPresetArgs, global: &GlobalArgs, config: &Config) -> CliResult<()> {
    let coordinator = global.open(config)?;
    let outcome = match coordinator.apply(&args.name).await {
        Ok(outcome) => outcome,
        Err(PresetError::NotFound { .. }) => {
            return Err(CliError::reported(ExitCode::Validation));
        }
        Err(e) => return Err(e.into()),
    };

    let (applied, filters) = match outcome {
        ApplyOutcome::Applied(filters) => (true, Some(filters)),
        ApplyOutcome::Superseded => (false, None),
    };

    if global.json {
        let response = ApplyResponse {
            context: global.context.clone(),
            preset: args.name.clone(),
            applied,
            filters,
        };
        println!("{}", to_json(&response)?);
    } else if let Some(filters) = filters {
        println!("{}", filters.summary());
    }

    Ok(())
}
