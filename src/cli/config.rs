//! Configuration management CLI commands.

use crate::cli::common::{CliError, CliResult, GlobalArgs};
use crate::config::Config;
use crate::constants::APP_NAME;
use crate::models::ContextCapabilities;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Print the config file location
    Path,
    /// Set a configuration value
    Set(ConfigSetArgs),
}

/// Set a configuration value
#[derive(Args, Debug, Clone)]
pub struct ConfigSetArgs {
    /// Key: data_dir, catalog_file, log_level or <context>.license_filter
    #[arg(value_name = "KEY")]
    key: String,

    /// New value (use an empty string to unset a path)
    #[arg(value_name = "VALUE")]
    value: String,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput {
    config_file: String,
    data_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog_file: Option<String>,
    log_level: String,
    contexts: BTreeMap<String, ContextCapabilities>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self, global: &GlobalArgs) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show => show(global),
            ConfigCommand::Path => {
                let path = Config::config_file_path()
                    .map_err(|e| CliError::io(format!("Failed to locate config file: {e}")))?;
                println!("{}", path.display());
                Ok(())
            }
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

fn show(global: &GlobalArgs) -> CliResult<()> {
    let config = Config::load()
        .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
    let config_file = Config::config_file_path()
        .map_err(|e| CliError::io(format!("Failed to locate config file: {e}")))?;
    let data_dir = config
        .data_dir()
        .map_err(|e| CliError::io(format!("Failed to resolve data directory: {e}")))?;

    let output = ConfigOutput {
        config_file: config_file.to_string_lossy().to_string(),
        data_dir: data_dir.to_string_lossy().to_string(),
        catalog_file: config
            .paths
            .catalog_file
            .as_ref()
            .map(|p| p.to_string_lossy().to_string()),
        log_level: config.logging.level.clone(),
        contexts: config.contexts.clone(),
    };

    if global.json {
        let json = serde_json::to_string_pretty(&output).map_err(|e| {
            CliError::io(format!("Failed to serialize configuration to JSON: {e}"))
        })?;
        println!("{json}");
        return Ok(());
    }

    let title = format!("{APP_NAME} Configuration");
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    println!();
    println!("Config file: {}", output.config_file);
    println!();
    println!("Paths:");
    println!("  Data Directory: {}", output.data_dir);
    match &output.catalog_file {
        Some(path) => println!("  Catalog: {path}"),
        None => println!("  Catalog: (not configured)"),
    }
    println!();
    println!("Logging:");
    println!("  Level: {}", output.log_level);
    if !output.contexts.is_empty() {
        println!();
        println!("Contexts:");
        for (name, caps) in &output.contexts {
            println!("  {name}: license filter {}", on_off(caps.license_filter));
        }
    }

    Ok(())
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        let mut config = Config::load().unwrap_or_default();

        match self.key.as_str() {
            "data_dir" => config.paths.data_dir = optional_path(&self.value),
            "catalog_file" => {
                let path = optional_path(&self.value);
                if let Some(path) = &path {
                    if !path.exists() {
                        return Err(CliError::validation(format!(
                            "Catalog file does not exist: {}",
                            path.display()
                        )));
                    }
                }
                config.paths.catalog_file = path;
            }
            "log_level" => config.logging.level = self.value.to_lowercase(),
            key => {
                let Some(context) = key.strip_suffix(".license_filter") else {
                    return Err(CliError::validation(format!(
                        "Unknown configuration key '{key}'. Expected data_dir, catalog_file, \
                         log_level or <context>.license_filter"
                    )));
                };
                let enabled = parse_bool(&self.value)?;
                config
                    .contexts
                    .entry(context.to_string())
                    .or_default()
                    .license_filter = enabled;
            }
        }

        config
            .validate()
            .map_err(|e| CliError::validation(e.to_string()))?;
        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");
        Ok(())
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.trim().is_empty()).then(|| PathBuf::from(value))
}

fn parse_bool(value: &str) -> CliResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => Err(CliError::validation(format!(
            "Invalid boolean '{value}'. Use true or false"
        ))),
    }
}

const fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
