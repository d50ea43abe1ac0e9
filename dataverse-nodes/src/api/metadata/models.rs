//! Dataverse metadata models

use serde::{Deserialize, Serialize};

/// Entity definition as offered in table pickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub logical_name: String,
    /// User-localized label, or the logical name when none is set
    pub display_name: String,
}

/// Attribute definition as offered in column pickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub logical_name: String,
    pub display_name: String,
}

/// Raw `EntityDefinitions` / `Attributes` row
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawDefinition {
    pub logical_name: String,
    #[serde(default)]
    pub display_name: Option<RawDisplayName>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawDisplayName {
    #[serde(default)]
    pub user_localized_label: Option<RawLabel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawLabel {
    #[serde(default)]
    pub label: Option<String>,
}

/// OData collection envelope
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ODataCollection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl RawDefinition {
    /// Localized label, falling back to the logical name when absent or blank
    pub fn label_or_logical_name(&self) -> String {
        self.display_name
            .as_ref()
            .and_then(|d| d.user_localized_label.as_ref())
            .and_then(|l| l.label.as_deref())
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(self.logical_name.as_str())
            .to_string()
    }
}
