//! Read queries and the request paths they resolve to

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::pluralization::pluralize_entity_name;
use crate::error::{DataverseError, Result};

static FETCHXML_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<entity\s+name\s*=\s*['"]([^'"]+)['"]"#).unwrap());

/// A read against the Web API, built per call from node parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Query {
    /// FetchXML document; the target collection comes from its `<entity>` tag
    FetchXml { xml: String },
    /// Path relative to the API root, used verbatim (`accounts?$top=5`)
    OData { path: String },
    /// Plain column projection over one entity
    Column { entity: String, columns: Vec<String> },
}

impl Query {
    pub fn fetch_xml(xml: impl Into<String>) -> Self {
        Self::FetchXml { xml: xml.into() }
    }

    pub fn odata(path: impl Into<String>) -> Self {
        Self::OData { path: path.into() }
    }

    pub fn columns<I, S>(entity: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Column {
            entity: entity.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve to a path relative to the API root (no leading slash)
    pub fn path(&self) -> Result<String> {
        match self {
            Query::FetchXml { xml } => {
                let entity = extract_entity_name(xml)?;
                Ok(format!(
                    "{}?fetchXml={}",
                    pluralize_entity_name(&entity),
                    urlencoding::encode(xml)
                ))
            }
            Query::OData { path } => {
                let path = path.trim().trim_start_matches('/');
                if path.is_empty() {
                    return Err(DataverseError::query("OData path is empty", path));
                }
                Ok(path.to_string())
            }
            Query::Column { entity, columns } => {
                let entity = entity.trim();
                if entity.is_empty() {
                    return Err(DataverseError::validation(
                        "entity name is required for a column query",
                    ));
                }
                let columns: Vec<&str> = columns
                    .iter()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .collect();
                if columns.is_empty() {
                    return Err(DataverseError::validation(format!(
                        "at least one column is required to query '{}'",
                        entity
                    )));
                }
                Ok(format!(
                    "{}?$select={}",
                    pluralize_entity_name(entity),
                    columns.join(",")
                ))
            }
        }
    }

    /// Human readable form for logs and error messages
    pub fn describe(&self) -> String {
        match self {
            Query::FetchXml { xml } => format!("FetchXML {}", xml),
            Query::OData { path } => format!("OData {}", path),
            Query::Column { entity, columns } => {
                format!("columns {} of {}", columns.join(","), entity)
            }
        }
    }
}

/// Pull the entity logical name out of `<entity name="...">`
pub fn extract_entity_name(fetch_xml: &str) -> Result<String> {
    FETCHXML_ENTITY
        .captures(fetch_xml)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            DataverseError::query("failed to extract entity name from FetchXML", fetch_xml)
        })
}
