//! Form document model
//!
//! Documents travel between nodes as plain JSON, so reading one is lenient:
//! a missing name becomes "Default Form", and malformed `steps` or `fields`
//! are read as empty lists instead of failing the step.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_FORM_NAME: &str = "Default Form";

/// Input element type of a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Number,
    Textarea,
    Other(String),
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "text" => FieldType::Text,
            "email" => FieldType::Email,
            "number" => FieldType::Number,
            "textarea" => FieldType::Textarea,
            _ => FieldType::Other(value.trim().to_string()),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Other(other) => other.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
}

impl FormField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Lenient read of one field object; non-objects yield `None`
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Some(Self {
            name: text("name"),
            label: text("label"),
            field_type: FieldType::from(text("type")),
            required: read_bool(object.get("required")),
        })
    }
}

/// Hosts hand booleans over as `true`, `"true"` or not at all
pub(crate) fn read_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormStep {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormStep {
    pub fn new(name: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            name: object
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            fields: read_fields(object.get("fields")),
        })
    }
}

/// Fields of a step; anything but an array reads as no fields
pub fn read_fields(value: Option<&Value>) -> Vec<FormField> {
    value
        .and_then(Value::as_array)
        .map(|fields| fields.iter().filter_map(FormField::from_value).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDocument {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<FormStep>,
}

impl Default for FormDocument {
    fn default() -> Self {
        Self {
            name: DEFAULT_FORM_NAME.to_string(),
            steps: Vec::new(),
        }
    }
}

impl FormDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Lenient read of a document produced by a previous node
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FORM_NAME)
            .to_string();

        let steps = object
            .get("steps")
            .and_then(Value::as_array)
            .map(|steps| steps.iter().filter_map(FormStep::from_value).collect())
            .unwrap_or_default();

        Self { name, steps }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
