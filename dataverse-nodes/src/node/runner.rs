//! Batch execution of the Dataverse node
//!
//! Items are processed strictly in order, one call chain at a time. A failing
//! item either aborts the batch or, with continue-on-failure, is emitted with
//! its error attached while the remaining items proceed.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::operation::{Operation, QueryType};
use super::parameters::{ParameterSource, names};
use crate::api::{DataverseClient, Query};
use crate::error::{DataverseError, ItemError, Result};

/// Error details attached to an item under continue-on-failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemErrorInfo {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&DataverseError> for ItemErrorInfo {
    fn from(err: &DataverseError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            status: err.status(),
        }
    }
}

/// One output item, paired with the input item that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub json: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemErrorInfo>,
    pub paired_item: usize,
}

impl ItemResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug)]
pub struct NodeRunner<'a> {
    client: &'a DataverseClient,
    continue_on_fail: bool,
}

impl<'a> NodeRunner<'a> {
    pub fn new(client: &'a DataverseClient) -> Self {
        Self {
            client,
            continue_on_fail: false,
        }
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    /// Run `operation` once per input item
    pub async fn run(
        &self,
        operation: Operation,
        params: &dyn ParameterSource,
        items: &[Value],
    ) -> std::result::Result<Vec<ItemResult>, ItemError> {
        let mut results = Vec::with_capacity(items.len());

        for (item_index, item) in items.iter().enumerate() {
            match self.execute_item(operation, params, item_index).await {
                Ok(json) => results.push(ItemResult {
                    json,
                    error: None,
                    paired_item: item_index,
                }),
                Err(err) if self.continue_on_fail => {
                    warn!("{} failed for item {}: {}", operation, item_index, err);
                    results.push(ItemResult {
                        json: item.clone(),
                        error: Some(ItemErrorInfo::from(&err)),
                        paired_item: item_index,
                    });
                }
                Err(err) => {
                    return Err(ItemError {
                        item_index,
                        source: err,
                    });
                }
            }
        }

        Ok(results)
    }

    async fn execute_item(
        &self,
        operation: Operation,
        params: &dyn ParameterSource,
        item_index: usize,
    ) -> Result<Value> {
        debug!("Executing {} for item {}", operation, item_index);
        match operation {
            Operation::Get => {
                let query = build_query(params, item_index)?;
                self.client.get(&query).await
            }
            Operation::Patch => {
                let entity = params.required_string(names::ENTITY_NAME, item_index)?;
                let record_id = params.required_string(names::RECORD_ID, item_index)?;
                let body = params.optional_json(names::UPDATE_DATA, item_index)?;
                let columns = params.optional_json(names::UPDATE_COLUMNS, item_index)?;
                self.client
                    .update(&entity, &record_id, body.as_ref(), columns.as_ref())
                    .await
            }
            Operation::Post => {
                let entity = params.required_string(names::ENTITY_NAME, item_index)?;
                let body = params.optional_json(names::CREATE_DATA, item_index)?;
                let columns = params.optional_json(names::CREATE_COLUMNS, item_index)?;
                self.client
                    .create(&entity, body.as_ref(), columns.as_ref())
                    .await
            }
            Operation::OptionSet => {
                let entity = params.required_string(names::OPTIONSET_ENTITY_NAME, item_index)?;
                let attribute =
                    params.required_string(names::OPTIONSET_ATTRIBUTE_NAME, item_index)?;
                self.client.entity_option_set(&entity, &attribute).await
            }
            Operation::GlobalOptionSet => {
                let name = params.required_string(names::GLOBAL_ATTRIBUTE_NAME, item_index)?;
                self.client.global_option_set(&name).await
            }
            Operation::Entity => {
                let entity = params.required_string(names::ENTITY_NAME, item_index)?;
                let id_column = params.required_string(names::ENTITY_ID_COLUMN, item_index)?;
                let name_column = params.required_string(names::ENTITY_NAME_COLUMN, item_index)?;
                self.client
                    .entity_lookup(&entity, &id_column, &name_column)
                    .await
            }
        }
    }
}

/// Build the GET query for one item from `type`, `getQuery` and friends
pub fn build_query(params: &dyn ParameterSource, item_index: usize) -> Result<Query> {
    let query_type = match params.get_parameter(names::QUERY_TYPE, item_index) {
        Some(Value::String(s)) => s.parse::<QueryType>()?,
        None | Some(Value::Null) => QueryType::FetchXml,
        Some(other) => {
            return Err(DataverseError::validation(format!(
                "parameter 'type' must be a string, got {}",
                other
            )));
        }
    };

    match query_type {
        QueryType::FetchXml => Ok(Query::fetch_xml(
            params.required_string(names::GET_QUERY, item_index)?,
        )),
        QueryType::OData => Ok(Query::odata(
            params.required_string(names::GET_QUERY, item_index)?,
        )),
        QueryType::Column => {
            let entity = params.required_string(names::ENTITY_NAME, item_index)?;
            let columns = params.string_list(names::COLUMNS, item_index)?;
            Ok(Query::columns(entity, columns))
        }
    }
}

/// Summary line for logs and CLI output
pub fn summarize(results: &[ItemResult]) -> Value {
    let failed = results.iter().filter(|r| r.is_error()).count();
    json!({
        "items": results.len(),
        "succeeded": results.len() - failed,
        "failed": failed,
    })
}
