//! Node parameter access
//!
//! Hosts resolve parameters per input item (expressions may reference the
//! item). [`ParameterSource`] is the only thing the runner needs from them.

use serde_json::{Map, Value};

use crate::error::{DataverseError, Result};

/// Parameter names understood by the Dataverse node
pub mod names {
    pub const QUERY_TYPE: &str = "type";
    pub const GET_QUERY: &str = "getQuery";
    pub const COLUMNS: &str = "columns";
    pub const ENTITY_NAME: &str = "entityName";
    pub const RECORD_ID: &str = "recordId";
    pub const UPDATE_DATA: &str = "updateData";
    pub const UPDATE_COLUMNS: &str = "column";
    pub const CREATE_DATA: &str = "createData";
    pub const CREATE_COLUMNS: &str = "postcolumn";
    pub const OPTIONSET_ENTITY_NAME: &str = "optionsetEntityName";
    pub const OPTIONSET_ATTRIBUTE_NAME: &str = "optionsetAttributeName";
    pub const GLOBAL_ATTRIBUTE_NAME: &str = "globalAttributeName";
    pub const ENTITY_ID_COLUMN: &str = "entityId";
    pub const ENTITY_NAME_COLUMN: &str = "entityNameColumn";
}

pub trait ParameterSource: Send + Sync {
    /// Value of `name` as resolved for the item at `item_index`
    fn get_parameter(&self, name: &str, item_index: usize) -> Option<Value>;

    fn required_string(&self, name: &str, item_index: usize) -> Result<String> {
        match self.get_parameter(name, item_index) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::String(_)) | Some(Value::Null) | None => Err(DataverseError::validation(
                format!("parameter '{}' is required", name),
            )),
            Some(other) => Err(DataverseError::validation(format!(
                "parameter '{}' must be a string, got {}",
                name, other
            ))),
        }
    }

    /// A JSON parameter; strings are parsed so hosts may pass raw JSON text
    fn optional_json(&self, name: &str, item_index: usize) -> Result<Option<Value>> {
        match self.get_parameter(name, item_index) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => serde_json::from_str(&s).map(Some).map_err(|e| {
                DataverseError::validation(format!("parameter '{}' is not valid JSON: {}", name, e))
            }),
            Some(other) => Ok(Some(other)),
        }
    }

    /// A list of names, given either as an array or a comma-separated string
    fn string_list(&self, name: &str, item_index: usize) -> Result<Vec<String>> {
        match self.get_parameter(name, item_index) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(s
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(DataverseError::validation(format!(
                        "parameter '{}' must contain strings, got {}",
                        name, other
                    ))),
                })
                .collect(),
            Some(other) => Err(DataverseError::validation(format!(
                "parameter '{}' must be a list, got {}",
                name, other
            ))),
        }
    }
}

/// Parameters held as JSON: shared values plus optional per-item overrides
#[derive(Debug, Clone, Default)]
pub struct JsonParameters {
    shared: Map<String, Value>,
    per_item: Vec<Map<String, Value>>,
}

impl JsonParameters {
    pub fn new(shared: Map<String, Value>) -> Self {
        Self {
            shared,
            per_item: Vec::new(),
        }
    }

    /// Build from a JSON object; anything else is a validation error
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::new(map)),
            Value::Null => Ok(Self::default()),
            other => Err(DataverseError::validation(format!(
                "parameters must be a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn with_item_overrides(mut self, per_item: Vec<Map<String, Value>>) -> Self {
        self.per_item = per_item;
        self
    }
}

impl ParameterSource for JsonParameters {
    fn get_parameter(&self, name: &str, item_index: usize) -> Option<Value> {
        self.per_item
            .get(item_index)
            .and_then(|overrides| overrides.get(name))
            .or_else(|| self.shared.get(name))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> JsonParameters {
        JsonParameters::from_value(value).unwrap()
    }

    #[test]
    fn test_item_overrides_shadow_shared_values() {
        let mut overrides = Map::new();
        overrides.insert("recordId".to_string(), json!("r2"));
        let params = params(json!({"recordId": "r1", "entityName": "contact"}))
            .with_item_overrides(vec![Map::new(), overrides]);

        assert_eq!(params.required_string("recordId", 0).unwrap(), "r1");
        assert_eq!(params.required_string("recordId", 1).unwrap(), "r2");
        assert_eq!(params.required_string("entityName", 1).unwrap(), "contact");
    }

    #[test]
    fn test_required_string_rejects_blank_and_missing() {
        let params = params(json!({"blank": "  ", "obj": {}}));
        assert_eq!(params.required_string("blank", 0).unwrap_err().kind(), "ValidationError");
        assert_eq!(params.required_string("missing", 0).unwrap_err().kind(), "ValidationError");
        assert_eq!(params.required_string("obj", 0).unwrap_err().kind(), "ValidationError");
    }

    #[test]
    fn test_optional_json_parses_strings() {
        let params = params(json!({"text": "{\"a\": 1}", "object": {"b": 2}, "empty": ""}));
        assert_eq!(params.optional_json("text", 0).unwrap(), Some(json!({"a": 1})));
        assert_eq!(params.optional_json("object", 0).unwrap(), Some(json!({"b": 2})));
        assert_eq!(params.optional_json("empty", 0).unwrap(), None);
        assert_eq!(params.optional_json("missing", 0).unwrap(), None);

        let bad = JsonParameters::from_value(json!({"text": "{nope"})).unwrap();
        assert_eq!(bad.optional_json("text", 0).unwrap_err().kind(), "ValidationError");
    }

    #[test]
    fn test_string_list_accepts_array_or_csv() {
        let params = params(json!({"csv": "name, accountid,,", "array": ["a", "b"], "bad": [1]}));
        assert_eq!(params.string_list("csv", 0).unwrap(), vec!["name", "accountid"]);
        assert_eq!(params.string_list("array", 0).unwrap(), vec!["a", "b"]);
        assert!(params.string_list("bad", 0).is_err());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(JsonParameters::from_value(json!([1])).is_err());
    }
}
