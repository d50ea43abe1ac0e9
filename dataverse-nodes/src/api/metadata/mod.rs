//! Dataverse metadata: table and column listings

pub mod cache;
pub mod models;

pub use cache::MetadataCache;
pub use models::{ColumnInfo, TableInfo};

use serde_json::Value;

use crate::error::{DataverseError, Result};
use models::{ODataCollection, RawDefinition};

fn parse_definitions(value: Value) -> Result<Vec<RawDefinition>> {
    let body = value.to_string();
    serde_json::from_value::<ODataCollection<RawDefinition>>(value)
        .map(|collection| collection.value)
        .map_err(|e| DataverseError::decode(format!("unexpected metadata shape: {}", e), body))
}

/// Parse an `EntityDefinitions?$select=LogicalName,DisplayName` response
pub fn parse_table_list(value: Value) -> Result<Vec<TableInfo>> {
    Ok(parse_definitions(value)?
        .into_iter()
        .map(|raw| TableInfo {
            display_name: raw.label_or_logical_name(),
            logical_name: raw.logical_name,
        })
        .collect())
}

/// Parse an `EntityDefinitions(...)/Attributes?$select=LogicalName,DisplayName` response
pub fn parse_column_list(value: Value) -> Result<Vec<ColumnInfo>> {
    Ok(parse_definitions(value)?
        .into_iter()
        .map(|raw| ColumnInfo {
            display_name: raw.label_or_logical_name(),
            logical_name: raw.logical_name,
        })
        .collect())
}
