//! Building form documents step by step
//!
//! The trigger seeds a document with a single step, every step node appends
//! one more, and the finalizer renders whatever has accumulated.

use serde_json::Value;

use super::models::{FieldType, FormDocument, FormField, FormStep, read_bool, read_fields};

pub const TRIGGER_STEP_NAME: &str = "Step 1";

/// Append a step to the document carried by the previous item.
///
/// `existing` is whatever JSON the previous node produced; a missing or
/// malformed document starts a fresh "Default Form".
pub fn append_step(
    existing: Option<&Value>,
    step_name: impl Into<String>,
    fields: Vec<FormField>,
) -> FormDocument {
    let mut document = existing.map(FormDocument::from_value).unwrap_or_default();
    document.steps.push(FormStep::new(step_name, fields));
    document
}

/// Fields of a step node, given as `{stepInput: [{name, label, type, required}]}`
pub fn step_inputs(value: &Value) -> Vec<FormField> {
    read_fields(value.get("stepInput"))
}

/// Initial document built from the trigger's form inputs.
///
/// Inputs arrive as `{formInput: [{formInputName, formInputLabel,
/// formInputType, formInputRequired}]}`; anything else yields an empty step.
pub fn trigger_document(form_name: impl Into<String>, inputs: &Value) -> FormDocument {
    let fields = inputs
        .get("formInput")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(trigger_field).collect())
        .unwrap_or_default();

    let mut document = FormDocument::new(form_name);
    document.steps.push(FormStep::new(TRIGGER_STEP_NAME, fields));
    document
}

fn trigger_field(entry: &Value) -> Option<FormField> {
    let object = entry.as_object()?;
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(
        FormField::new(
            text("formInputName"),
            text("formInputLabel"),
            FieldType::from(text("formInputType")),
        )
        .required(read_bool(object.get("formInputRequired"))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::models::DEFAULT_FORM_NAME;
    use serde_json::json;

    fn field(name: &str) -> FormField {
        FormField::new(name, name.to_uppercase(), FieldType::Text)
    }

    #[test]
    fn test_steps_accumulate_in_order() {
        let first = append_step(None, "A", vec![field("a")]);
        let second = append_step(Some(&first.to_value()), "B", vec![field("b")]);

        assert_eq!(second.name, DEFAULT_FORM_NAME);
        let names: Vec<&str> = second.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(second.steps[0].fields, vec![field("a")]);
    }

    #[test]
    fn test_append_keeps_existing_form_name() {
        let existing = json!({"name": "Signup", "steps": [{"name": "Intro", "fields": []}]});
        let doc = append_step(Some(&existing), "Details", Vec::new());

        assert_eq!(doc.name, "Signup");
        assert_eq!(doc.steps.len(), 2);
        assert_eq!(doc.steps[1].name, "Details");
    }

    #[test]
    fn test_append_to_malformed_document() {
        let doc = append_step(Some(&json!({"name": 7, "steps": {"x": 1}})), "Only", Vec::new());
        assert_eq!(doc.name, DEFAULT_FORM_NAME);
        assert_eq!(doc.steps, vec![FormStep::new("Only", Vec::new())]);
    }

    #[test]
    fn test_step_inputs() {
        let fields = step_inputs(&json!({"stepInput": [
            {"name": "age", "label": "Age", "type": "number", "required": true}
        ]}));
        assert_eq!(fields, vec![FormField::new("age", "Age", FieldType::Number).required(true)]);
        assert!(step_inputs(&json!({})).is_empty());
    }

    #[test]
    fn test_trigger_document_has_single_step() {
        let doc = trigger_document(
            "Contact us",
            &json!({"formInput": [
                {"formInputName": "email", "formInputLabel": "Email", "formInputType": "email", "formInputRequired": true},
                {"formInputName": "note", "formInputLabel": "Note", "formInputType": "textarea"}
            ]}),
        );

        assert_eq!(doc.name, "Contact us");
        assert_eq!(doc.steps.len(), 1);
        assert_eq!(doc.steps[0].name, TRIGGER_STEP_NAME);
        assert_eq!(
            doc.steps[0].fields,
            vec![
                FormField::new("email", "Email", FieldType::Email).required(true),
                FormField::new("note", "Note", FieldType::Textarea),
            ]
        );
    }

    #[test]
    fn test_trigger_document_without_inputs() {
        let doc = trigger_document("Empty", &json!({"formInput": "nope"}));
        assert_eq!(doc.steps, vec![FormStep::new(TRIGGER_STEP_NAME, Vec::new())]);
    }
}
