//! Config command handlers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use readlist_core::{Config, MergeMode};

use crate::output::{Output, OutputFormat};

/// Keys accepted by `config set`
const KEYS: &[&str] = &[
    "data_dir",
    "export_dir",
    "default_import_mode",
    "fetch_titles",
    "log_file",
];

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "export_dir": config.export_dir,
                    "default_import_mode": config.default_import_mode,
                    "fetch_titles": config.fetch_titles,
                    "log_file": config.log_file,
                    "collection": config.collection_path()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:            {}", config.data_dir.display());
            println!(
                "  export_dir:          {}",
                display_optional(config.export_dir.as_deref())
            );
            println!("  default_import_mode: {}", config.default_import_mode);
            println!("  fetch_titles:        {}", config.fetch_titles);
            println!(
                "  log_file:            {}",
                display_optional(config.log_file.as_deref())
            );
            println!();
            println!("Reading list: {}", config.collection_path().display());
            println!("Config file:  {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Validate `value` and store it under `key`
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            if value.is_empty() {
                bail!("data_dir cannot be empty");
            }
            config.data_dir = value.into();
        }
        "export_dir" => {
            config.export_dir = optional_path(value);
        }
        "default_import_mode" => {
            config.default_import_mode = value.parse::<MergeMode>()?;
        }
        "fetch_titles" => {
            config.fetch_titles = value
                .parse()
                .context("Invalid value for fetch_titles. Use 'true' or 'false'.")?;
        }
        "log_file" => {
            config.log_file = optional_path(value);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: {}",
                key,
                KEYS.join(", ")
            );
        }
    }
    Ok(())
}

/// `""` and `"none"` clear an optional path
fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

fn display_optional(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
