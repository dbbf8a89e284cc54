//! Live filter selection commands.

use crate::cli::common::{to_json, CliError, CliResult, GlobalArgs};
use crate::config::Config;
use crate::models::{FilterState, TriState};
use clap::{Args, Subcommand};
use serde::Serialize;

/// Inspect and change the live filter selection
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Filter subcommand
    #[command(subcommand)]
    pub command: FilterCommand,
}

/// Filter subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum FilterCommand {
    /// Show the live selection
    Show,
    /// Toggle filters (tags and licenses cycle include -> exclude -> off)
    Toggle(ToggleArgs),
    /// Clear every filter
    Clear,
}

/// Toggle filters
#[derive(Debug, Clone, Args)]
pub struct ToggleArgs {
    /// Tag to cycle (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// License key to cycle (repeatable)
    #[arg(long = "license", value_name = "KEY")]
    pub licenses: Vec<String>,

    /// Base model to toggle (repeatable)
    #[arg(long = "base-model", value_name = "LABEL")]
    pub base_models: Vec<String>,

    /// Model type to toggle (repeatable)
    #[arg(long = "model-type", value_name = "TYPE")]
    pub model_types: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterResponse {
    context: String,
    active_preset: Option<String>,
    active_count: usize,
    filters: FilterState,
}

impl FilterArgs {
    /// Execute the filter command
    pub fn execute(&self, global: &GlobalArgs, config: &Config) -> CliResult<()> {
        let coordinator = global.open(config)?;

        match &self.command {
            FilterCommand::Show => {}
            FilterCommand::Toggle(args) => {
                if args.is_empty() {
                    return Err(CliError::validation(
                        "Nothing to toggle. Use --tag, --license, --base-model or --model-type",
                    ));
                }
                coordinator.update_filters(|filters| args.apply(filters));
            }
            FilterCommand::Clear => coordinator.clear_filters(),
        }

        print_selection(
            global,
            &coordinator.filters(),
            coordinator.active_preset(),
        )
    }
}

impl ToggleArgs {
    fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.licenses.is_empty()
            && self.base_models.is_empty()
            && self.model_types.is_empty()
    }

    fn apply(&self, filters: &mut FilterState) {
        for tag in &self.tags {
            filters.toggle_tag(tag);
        }
        for key in &self.licenses {
            filters.toggle_license(key);
        }
        for label in &self.base_models {
            filters.toggle_base_model(label);
        }
        for key in &self.model_types {
            filters.toggle_model_type(key);
        }
    }
}

fn print_selection(
    global: &GlobalArgs,
    filters: &FilterState,
    active_preset: Option<String>,
) -> CliResult<()> {
    if global.json {
        let response = FilterResponse {
            context: global.context.clone(),
            active_preset,
            active_count: filters.active_count(),
            filters: filters.clone(),
        };
        println!("{}", to_json(&response)?);
        return Ok(());
    }

    println!("{} ({})", filters.summary(), global.context);
    if let Some(name) = active_preset {
        println!("Preset: {name}");
    }
    if !filters.base_model().is_empty() {
        let labels: Vec<&str> = filters.base_model().iter().map(String::as_str).collect();
        println!("  base models: {}", labels.join(", "));
    }
    for (label, entries) in [("tags", filters.tags()), ("license", filters.license())] {
        if entries.is_empty() {
            continue;
        }
        let rendered: Vec<String> = entries
            .iter()
            .map(|(key, state)| match state {
                TriState::Exclude => format!("-{key}"),
                _ => format!("+{key}"),
            })
            .collect();
        println!("  {label}: {}", rendered.join(" "));
    }
    if !filters.model_types().is_empty() {
        let types: Vec<&str> = filters.model_types().iter().map(String::as_str).collect();
        println!("  model types: {}", types.join(", "));
    }

    Ok(())
}
