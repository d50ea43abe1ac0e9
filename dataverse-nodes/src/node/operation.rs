//! Operations exposed by the Dataverse node

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DataverseError;

/// What the node does with each input item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Read records with FetchXML, an OData path or a column projection
    Get,
    /// Update a record
    Patch,
    /// Create a record
    Post,
    /// Options of an entity's picklist attribute
    #[serde(rename = "OPTIONSET")]
    OptionSet,
    /// Options of a global option set
    #[serde(rename = "GLOBALOPTIONSET")]
    GlobalOptionSet,
    /// Id/name pairs from an arbitrary entity
    Entity,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Get,
        Operation::Patch,
        Operation::Post,
        Operation::OptionSet,
        Operation::GlobalOptionSet,
        Operation::Entity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::OptionSet => "OPTIONSET",
            Self::GlobalOptionSet => "GLOBALOPTIONSET",
            Self::Entity => "ENTITY",
        }
    }

    /// Label shown by hosts in their operation picker
    pub fn action(&self) -> &'static str {
        match self {
            Self::Get => "Retrieve data",
            Self::Patch => "Update record",
            Self::Post => "Create record",
            Self::OptionSet => "Retrieve lookup data from OptionSet",
            Self::GlobalOptionSet => "Retrieve lookup data from GlobalOptionSetDefinitions",
            Self::Entity => "Retrieve lookup data from table",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DataverseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DataverseError::validation(format!("unknown operation '{}'", s)))
    }
}

/// Flavour of a GET operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    #[serde(rename = "FETCHXML")]
    FetchXml,
    #[serde(rename = "ODATA")]
    OData,
    Column,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchXml => "FETCHXML",
            Self::OData => "ODATA",
            Self::Column => "COLUMN",
        }
    }
}

impl FromStr for QueryType {
    type Err = DataverseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FETCHXML" => Ok(Self::FetchXml),
            "ODATA" => Ok(Self::OData),
            "COLUMN" => Ok(Self::Column),
            _ => Err(DataverseError::validation(format!(
                "unknown query type '{}', expected FETCHXML, ODATA or COLUMN",
                s
            ))),
        }
    }
}
