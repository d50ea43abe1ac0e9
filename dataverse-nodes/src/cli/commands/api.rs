//! Dataverse command handlers

use anyhow::{Context, Result};
use colored::*;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::Path;
use std::time::Instant;

use super::{print_json, read_json_file};
use crate::cli::{Commands, GetArgs, QueryKind};
use dataverse_nodes::api::{DataverseClient, Query};
use dataverse_nodes::config::ConnectorConfig;
use dataverse_nodes::node::{JsonParameters, NodeRunner, Operation, summarize};

pub async fn handle_api_command(command: Commands, config: &ConnectorConfig) -> Result<()> {
    let client = config.client().context("Failed to create Dataverse client")?;

    match command {
        Commands::Get(args) => {
            let query = build_query(args)?;
            let start = Instant::now();
            let result = client
                .get(&query)
                .await
                .with_context(|| format!("Failed to execute {}", query.describe()))?;
            log::info!("Query completed in {:?}", start.elapsed());
            print_json(&result)
        }
        Commands::Update(args) => {
            let body = parse_json_arg(args.data.as_deref())?;
            let overrides = column_overrides(&args.columns)?;
            let result = client
                .update(&args.entity, &args.record_id, body.as_ref(), Some(&overrides))
                .await
                .with_context(|| format!("Failed to update {} {}", args.entity, args.record_id))?;
            println!("{} {} {}", "Updated".green().bold(), args.entity, args.record_id);
            print_json(&result)
        }
        Commands::Create(args) => {
            let body = parse_json_arg(args.data.as_deref())?;
            let overrides = column_overrides(&args.columns)?;
            let result = client
                .create(&args.entity, body.as_ref(), Some(&overrides))
                .await
                .with_context(|| format!("Failed to create {} record", args.entity))?;
            println!("{} {}", "Created".green().bold(), args.entity);
            print_json(&result)
        }
        Commands::Tables => {
            let tables = client.list_tables().await.context("Failed to list tables")?;
            for table in &tables {
                println!("{:<40} {}", table.logical_name.cyan(), table.display_name);
            }
            println!("{}", format!("{} tables", tables.len()).dimmed());
            Ok(())
        }
        Commands::Columns { entity } => {
            let columns = client
                .list_columns(&entity)
                .await
                .with_context(|| format!("Failed to list columns of {}", entity))?;
            for column in &columns {
                println!("{:<40} {}", column.logical_name.cyan(), column.display_name);
            }
            println!("{}", format!("{} columns", columns.len()).dimmed());
            Ok(())
        }
        Commands::OptionSet { entity, attribute } => {
            let result = client
                .entity_option_set(&entity, &attribute)
                .await
                .with_context(|| format!("Failed to read option set {}.{}", entity, attribute))?;
            print_json(&result)
        }
        Commands::GlobalOptionSet { name } => {
            let result = client
                .global_option_set(&name)
                .await
                .with_context(|| format!("Failed to read global option set {}", name))?;
            print_json(&result)
        }
        Commands::Lookup {
            entity,
            id_column,
            name_column,
        } => {
            let result = client
                .entity_lookup(&entity, &id_column, &name_column)
                .await
                .with_context(|| format!("Failed to read lookup data from {}", entity))?;
            print_json(&result)
        }
        Commands::Run {
            file,
            continue_on_fail,
        } => run_batch(&client, &file, continue_on_fail).await,
        Commands::Form(_) => unreachable!("form commands never reach the API handler"),
    }
}

fn build_query(args: GetArgs) -> Result<Query> {
    let text = match (args.query, args.file) {
        (Some(query), _) => Some(query),
        (None, Some(path)) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read query file: {}", path.display()))?;
            Some(content.trim().to_string())
        }
        (None, None) => None,
    };

    match args.query_type {
        QueryKind::Column => {
            let entity = args
                .entity
                .context("--entity is required for column queries")?;
            let columns = args.columns.unwrap_or_default();
            Ok(Query::columns(
                entity,
                columns.split(',').map(str::trim).filter(|c| !c.is_empty()),
            ))
        }
        QueryKind::Fetchxml => Ok(Query::fetch_xml(
            text.context("Provide a FetchXML query or --file")?,
        )),
        QueryKind::Odata => Ok(Query::odata(
            text.context("Provide an OData path or --file")?,
        )),
    }
}

fn parse_json_arg(data: Option<&str>) -> Result<Option<Value>> {
    data.map(|text| serde_json::from_str(text).context("--data is not valid JSON"))
        .transpose()
}

/// Turn repeated `NAME=VALUE` flags into the `{columnValues: [...]}` collection.
///
/// Values that parse as JSON keep their type (`42`, `true`, `null`); anything
/// else is sent as a string.
pub fn column_overrides(pairs: &[String]) -> Result<Value> {
    let entries = pairs
        .iter()
        .map(|pair| {
            let (name, raw) = pair
                .split_once('=')
                .with_context(|| format!("Expected NAME=VALUE, got '{}'", pair))?;
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            Ok(json!({"columnName": name.trim(), "columnValue": value}))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({ "columnValues": entries }))
}

/// Batch description consumed by `run`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFile {
    pub operation: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub items: Vec<Value>,
    /// Per-item parameter overrides, matched to `items` by position
    #[serde(default)]
    pub item_parameters: Vec<Map<String, Value>>,
}

impl BatchFile {
    pub fn from_value(value: Value) -> Result<Self> {
        let mut batch: BatchFile =
            serde_json::from_value(value).context("Batch file has an unexpected shape")?;
        if batch.items.is_empty() {
            batch.items = vec![json!({})];
        }
        Ok(batch)
    }
}

async fn run_batch(client: &DataverseClient, path: &Path, continue_on_fail: bool) -> Result<()> {
    let batch = BatchFile::from_value(read_json_file(path)?)?;
    let operation: Operation = batch.operation.parse()?;
    let params = JsonParameters::new(batch.parameters).with_item_overrides(batch.item_parameters);

    println!(
        "Running {} ({}) over {} items",
        operation.as_str().cyan().bold(),
        operation.action(),
        batch.items.len()
    );

    let results = NodeRunner::new(client)
        .continue_on_fail(continue_on_fail)
        .run(operation, &params, &batch.items)
        .await
        .with_context(|| format!("{} batch aborted", operation))?;

    let output = serde_json::to_value(&results).context("Failed to serialize results")?;
    print_json(&output)?;

    let summary = summarize(&results);
    let failed = summary["failed"].as_u64().unwrap_or(0);
    let line = format!(
        "{} succeeded, {} failed",
        summary["succeeded"], summary["failed"]
    );
    if failed > 0 {
        println!("{}", line.yellow());
    } else {
        println!("{}", line.green());
    }
    Ok(())
}
