//! Column overrides for create and update bodies
//!
//! Hosts hand over column edits as a fixed collection:
//! `{"columnValues": [{"columnName": "lastname", "columnValue": "B"}]}`.
//! Entries are merged over the JSON body, later entries winning.

use serde_json::{Map, Value};

use crate::error::{DataverseError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    pub column_name: String,
    pub column_value: Value,
}

/// Parse the `{columnValues: [...]}` collection
///
/// A missing collection, `null`, or an object without `columnValues` means
/// "no overrides". Entries with an empty or absent `columnName` are skipped,
/// matching what the parameter UI produces for half-filled rows. Anything
/// structurally wrong is a validation error.
pub fn parse_column_values(collection: Option<&Value>) -> Result<Vec<ColumnValue>> {
    let collection = match collection {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(DataverseError::validation(format!(
                "column collection must be an object, got {}",
                other
            )));
        }
    };

    let entries = match collection.get("columnValues") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(DataverseError::validation(format!(
                "columnValues must be an array, got {}",
                other
            )));
        }
    };

    let mut values = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let entry = entry.as_object().ok_or_else(|| {
            DataverseError::validation(format!("columnValues[{}] must be an object", index))
        })?;

        let name = match entry.get("columnName") {
            None | Some(Value::Null) => continue,
            Some(Value::String(name)) if name.trim().is_empty() => continue,
            Some(Value::String(name)) => name.trim().to_string(),
            Some(other) => {
                return Err(DataverseError::validation(format!(
                    "columnValues[{}].columnName must be a string, got {}",
                    index, other
                )));
            }
        };

        values.push(ColumnValue {
            column_name: name,
            column_value: entry.get("columnValue").cloned().unwrap_or(Value::Null),
        });
    }

    Ok(values)
}

/// Merge `overrides` into a copy of `body`; overrides replace same-named keys
pub fn merge_body(body: Option<&Value>, overrides: &[ColumnValue]) -> Result<Map<String, Value>> {
    let mut merged = match body {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(DataverseError::validation(format!(
                "record body must be a JSON object, got {}",
                other
            )));
        }
    };

    for column in overrides {
        merged.insert(column.column_name.clone(), column.column_value.clone());
    }

    Ok(merged)
}
