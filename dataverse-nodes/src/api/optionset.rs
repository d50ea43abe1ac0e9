//! Option-set decoding
//!
//! Option metadata comes back in different envelopes depending on the
//! endpoint: global option set definitions are flat, picklist attributes
//! expanded with `$expand=OptionSet` nest the options one level down, and
//! collection queries wrap that again in `value[0]`. Each envelope has its own
//! matcher; they are tried in a fixed order and the first match wins.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One selectable option, shaped for lookup dropdowns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Envelope an option list was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSetShape {
    /// `{ "Options": [...] }`
    Flat,
    /// `{ "OptionSet": { "Options": [...] } }`
    Nested,
    /// `{ "value": [ { "OptionSet": { "Options": [...] } } ] }`
    Collection,
}

impl OptionSetShape {
    /// Matchers in priority order
    pub const PRIORITY: [OptionSetShape; 3] = [
        OptionSetShape::Flat,
        OptionSetShape::Nested,
        OptionSetShape::Collection,
    ];

    /// The raw options array, if `payload` has this shape
    pub fn options<'a>(&self, payload: &'a Value) -> Option<&'a Vec<Value>> {
        match self {
            OptionSetShape::Flat => payload.get("Options")?.as_array(),
            OptionSetShape::Nested => payload.get("OptionSet")?.get("Options")?.as_array(),
            OptionSetShape::Collection => payload
                .get("value")?
                .get(0)?
                .get("OptionSet")?
                .get("Options")?
                .as_array(),
        }
    }
}

/// Result of decoding: either a recognised option list or the untouched payload
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedOptionSet {
    Options {
        shape: OptionSetShape,
        entries: Vec<OptionEntry>,
    },
    Raw(Value),
}

impl DecodedOptionSet {
    /// `{options: [...]}` for recognised shapes, the raw payload otherwise
    pub fn into_json(self) -> Value {
        match self {
            DecodedOptionSet::Options { entries, .. } => json!({ "options": entries }),
            DecodedOptionSet::Raw(payload) => payload,
        }
    }
}

/// Map a single `{Value, Label.LocalizedLabels[0].Label}` option
fn decode_option(option: &Value) -> Option<OptionEntry> {
    let id = option.get("Value")?.as_i64()?;
    let name = option
        .get("Label")
        .and_then(|l| l.get("LocalizedLabels"))
        .and_then(|l| l.get(0))
        .and_then(|l| l.get("Label"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(OptionEntry { id, name })
}

pub fn decode_option_set(payload: Value) -> DecodedOptionSet {
    for shape in OptionSetShape::PRIORITY {
        if let Some(options) = shape.options(&payload) {
            let entries: Vec<OptionEntry> = options.iter().filter_map(decode_option).collect();
            if entries.len() != options.len() {
                debug!(
                    "Skipped {} option(s) without an integer Value",
                    options.len() - entries.len()
                );
            }
            return DecodedOptionSet::Options { shape, entries };
        }
    }
    DecodedOptionSet::Raw(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(value: i64, label: &str) -> Value {
        json!({
            "Value": value,
            "Label": {
                "LocalizedLabels": [{"Label": label, "LanguageCode": 1033}],
                "UserLocalizedLabel": {"Label": label}
            }
        })
    }

    #[test]
    fn test_flat_shape() {
        let decoded = decode_option_set(json!({"Name": "statuscode", "Options": [option(1, "Active")]}));
        assert_eq!(
            decoded,
            DecodedOptionSet::Options {
                shape: OptionSetShape::Flat,
                entries: vec![OptionEntry { id: 1, name: "Active".to_string() }],
            }
        );
    }

    #[test]
    fn test_nested_shape() {
        let payload = json!({"OptionSet": {"Options": [{"Value": 1, "Label": {"LocalizedLabels": [{"Label": "Open"}]}}]}});
        assert_eq!(
            decode_option_set(payload).into_json(),
            json!({"options": [{"Id": 1, "Name": "Open"}]})
        );
    }

    #[test]
    fn test_collection_shape() {
        let payload = json!({"value": [{"LogicalName": "x", "OptionSet": {"Options": [option(7, "Seven"), option(8, "Eight")]}}]});
        let decoded = decode_option_set(payload);
        assert!(matches!(
            decoded,
            DecodedOptionSet::Options { shape: OptionSetShape::Collection, ref entries } if entries.len() == 2
        ));
    }

    #[test]
    fn test_flat_takes_priority_over_nested() {
        let payload = json!({
            "Options": [option(1, "Flat")],
            "OptionSet": {"Options": [option(2, "Nested")]}
        });
        assert_eq!(
            decode_option_set(payload).into_json(),
            json!({"options": [{"Id": 1, "Name": "Flat"}]})
        );
    }

    #[test]
    fn test_unrecognised_shape_passes_through() {
        let payload = json!({"value": [], "@odata.context": "x"});
        assert_eq!(decode_option_set(payload.clone()).into_json(), payload);
    }

    #[test]
    fn test_missing_label_yields_empty_name() {
        let decoded = decode_option_set(json!({"Options": [{"Value": 3, "Label": {"LocalizedLabels": []}}]}));
        assert_eq!(
            decoded.into_json(),
            json!({"options": [{"Id": 3, "Name": ""}]})
        );
    }

    #[test]
    fn test_each_shape_matches_only_its_envelope() {
        let nested = json!({"OptionSet": {"Options": []}});
        assert!(OptionSetShape::Flat.options(&nested).is_none());
        assert!(OptionSetShape::Nested.options(&nested).is_some());
        assert!(OptionSetShape::Collection.options(&nested).is_none());
    }
}
