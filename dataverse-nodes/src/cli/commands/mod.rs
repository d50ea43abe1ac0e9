//! Command handlers

pub mod api;
pub mod form;

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::{Cli, Commands};
use dataverse_nodes::config::ConnectorConfig;

pub async fn dispatch(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Form(command) => form::handle_form_command(command),
        command => {
            let config = ConnectorConfig::load(cli.config.as_deref())
                .context("Failed to load configuration")?;
            api::handle_api_command(command, &config).await
        }
    }
}

pub(crate) fn read_json_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("File is not valid JSON: {}", path.display()))
}

pub(crate) fn print_json(value: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to format output")?;
    println!("{}", rendered);
    Ok(())
}
