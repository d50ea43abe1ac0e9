//! Form command handlers

use anyhow::{Context, Result};
use serde_json::json;

use super::{print_json, read_json_file};
use crate::cli::FormCommands;
use dataverse_nodes::form::{
    FieldType, FormField, WebhookRequest, append_step, finalize, parse_page_steps,
    render_multistep_page,
};

pub fn handle_form_command(command: FormCommands) -> Result<()> {
    match command {
        FormCommands::Append {
            input,
            step,
            fields,
        } => {
            let existing = input.as_deref().map(read_json_file).transpose()?;
            let fields = fields
                .iter()
                .map(|arg| parse_field_arg(arg))
                .collect::<Result<Vec<_>>>()?;

            let document = append_step(existing.as_ref(), step, fields);
            print_json(&document.to_value())
        }
        FormCommands::Render { file } => {
            let body = read_json_file(&file)?;
            // Accept the finalizer's webhook body or a bare document
            let body = if body.get("form").is_some() {
                body
            } else {
                json!({ "form": body })
            };

            let response = finalize(&WebhookRequest::post(body));
            if response.status != 200 {
                anyhow::bail!("{} ({})", response.body, file.display());
            }
            println!("{}", response.body);
            Ok(())
        }
        FormCommands::Page {
            file,
            title,
            webhook_url,
        } => {
            let steps = parse_page_steps(&read_json_file(&file)?);
            if steps.is_empty() {
                log::warn!("No steps found in {}", file.display());
            }
            println!("{}", render_multistep_page(&title, &steps, &webhook_url)?);
            Ok(())
        }
    }
}

/// Parse `name:label[:type[:required]]`; the label defaults to the name
pub fn parse_field_arg(arg: &str) -> Result<FormField> {
    let mut parts = arg.split(':').map(str::trim);
    let name = parts
        .next()
        .filter(|name| !name.is_empty())
        .with_context(|| format!("Field '{}' has no name", arg))?;
    let label = parts.next().filter(|l| !l.is_empty()).unwrap_or(name);
    let field_type = FieldType::from(parts.next().unwrap_or_default().to_string());
    let required = match parts.next() {
        None | Some("") | Some("optional") => false,
        Some("required") | Some("true") => true,
        Some(other) => anyhow::bail!(
            "Field '{}': expected 'required' or 'optional', got '{}'",
            arg,
            other
        ),
    };

    Ok(FormField::new(name, label, field_type).required(required))
}
