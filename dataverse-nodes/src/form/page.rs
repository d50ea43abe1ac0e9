//! Standalone multi-step page served by the form trigger
//!
//! Steps come from the trigger's `steps` parameter:
//! `{step: [{stepName, fields: {field: [{fieldLabel, fieldType}]}}]}`.
//! Only the first step is visible; the script walks the others with
//! previous/next buttons and posts the collected data back to the webhook.

use log::warn;
use minijinja::context;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::templates::{PAGE_TEMPLATE, render};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageField {
    pub field_label: String,
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStep {
    pub step_name: Option<String>,
    pub fields: Vec<PageField>,
}

impl PageStep {
    /// Display name, falling back to the 1-based position
    pub fn display_name(&self, index: usize) -> String {
        match self.step_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Step {}", index + 1),
        }
    }
}

/// Read trigger steps from `{step: [...]}` or a bare array.
///
/// Fields lacking a label or a type are dropped with a warning.
pub fn parse_page_steps(value: &Value) -> Vec<PageStep> {
    let entries: &[Value] = match value {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => match map.get("step") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|step| {
            let step_name = step
                .get("stepName")
                .and_then(Value::as_str)
                .map(str::to_string);

            let fields = step
                .get("fields")
                .and_then(|f| f.get("field"))
                .and_then(Value::as_array)
                .map(|fields| fields.iter().filter_map(page_field).collect())
                .unwrap_or_default();

            PageStep { step_name, fields }
        })
        .collect()
}

fn page_field(value: &Value) -> Option<PageField> {
    let label = value.get("fieldLabel").and_then(Value::as_str).unwrap_or_default();
    let field_type = value.get("fieldType").and_then(Value::as_str).unwrap_or_default();

    if label.is_empty() || field_type.is_empty() {
        warn!("Skipping form field without label or type: {}", value);
        return None;
    }

    Some(PageField {
        field_label: label.to_string(),
        field_type: field_type.to_string(),
    })
}

/// Full HTML page for the trigger's GET response
pub fn render_multistep_page(title: &str, steps: &[PageStep], webhook_url: &str) -> Result<String> {
    let steps: Vec<Value> = steps
        .iter()
        .enumerate()
        .map(|(index, step)| json!({"name": step.display_name(index), "fields": step.fields}))
        .collect();

    render(
        PAGE_TEMPLATE,
        context! { title => title, steps => steps, webhook_url => webhook_url },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_steps() -> Vec<PageStep> {
        parse_page_steps(&json!({"step": [
            {"stepName": "Contact", "fields": {"field": [
                {"fieldLabel": "Email", "fieldType": "email"},
                {"fieldLabel": "", "fieldType": "text"},
                {"fieldLabel": "Phone"}
            ]}},
            {"fields": {}}
        ]}))
    }

    #[test]
    fn test_parse_skips_incomplete_fields() {
        let steps = sample_steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step_name.as_deref(), Some("Contact"));
        assert_eq!(
            steps[0].fields,
            vec![PageField {
                field_label: "Email".to_string(),
                field_type: "email".to_string()
            }]
        );
        assert!(steps[1].fields.is_empty());
        assert_eq!(steps[1].display_name(1), "Step 2");
    }

    #[test]
    fn test_parse_accepts_bare_array_and_rejects_garbage() {
        let steps = parse_page_steps(&json!([{"stepName": "Only"}]));
        assert_eq!(steps.len(), 1);
        assert!(parse_page_steps(&json!("steps")).is_empty());
        assert!(parse_page_steps(&json!({"step": 3})).is_empty());
    }

    #[test]
    fn test_first_step_is_active() {
        let html = render_multistep_page("Survey", &sample_steps(), "https://hooks.test/form").unwrap();

        assert!(html.contains("<div class=\"step active\" data-step=\"Contact\">"));
        assert!(html.contains("<div class=\"step\" data-step=\"Step 2\">"));
        assert_eq!(html.matches("class=\"step active\"").count(), 1);
        assert!(html.contains("<input type=\"email\" name=\"Email\" required><br>"));
        assert!(!html.contains("Phone"));
    }

    #[test]
    fn test_page_targets_webhook() {
        let html = render_multistep_page("A & B", &[], "https://hooks.test/form?a=1&b=2").unwrap();

        assert!(html.contains("<title>A &amp; B</title>"));
        // the webhook URL lands escaped in the link and the form action
        assert_eq!(html.matches("a=1&amp;b=2").count(), 3);
        assert!(!html.contains("a=1&b=2"));
        assert!(html.contains("<form id=\"multistepForm\" method=\"POST\" action=\"https:"));
        assert!(html.contains("id=\"prevBtn\" disabled"));
        assert!(html.contains("id=\"submitBtn\""));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_step_divs_are_closed() {
        let html = render_multistep_page("T", &sample_steps(), "u").unwrap();
        assert_eq!(html.matches("<div class=\"step").count(), 2);
        // one extra for the webhook-url block
        assert_eq!(html.matches("</div>").count(), 3);
    }
}
