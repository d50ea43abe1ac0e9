//! Webhook handling for the form trigger and the finalizer
//!
//! The host owns the HTTP server; it hands each request over as a
//! [`WebhookRequest`] and either writes the returned response or starts the
//! workflow with the returned item.

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error, info};
use serde_json::{Value, json};

use super::models::FormDocument;
use super::page::{PageStep, render_multistep_page};
use super::render::render_form;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookRequest {
    pub method: String,
    pub body: Value,
}

impl WebhookRequest {
    pub fn new(method: impl Into<String>, body: Value) -> Self {
        Self {
            method: method.into(),
            body,
        }
    }

    pub fn get() -> Self {
        Self::new("GET", Value::Null)
    }

    pub fn post(body: Value) -> Self {
        Self::new("POST", body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl WebhookResponse {
    pub fn html(status: u16, body: String) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "text/html".to_string())],
            body,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// 200 with the rendered HTML, or a 500 when rendering failed
    pub fn rendered(result: Result<String>) -> Self {
        match result {
            Ok(body) => Self::html(200, body),
            Err(e) => {
                error!("{}", e);
                Self::text(500, "Form could not be rendered")
            }
        }
    }
}

/// What the host should do with a webhook call
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// Answer the caller directly; the workflow does not run
    Respond(WebhookResponse),
    /// Start the workflow with this item
    Workflow(Value),
}

/// Trigger serving the multi-step page and receiving its submissions
#[derive(Debug, Clone)]
pub struct FormTrigger {
    pub title: String,
    pub steps: Vec<PageStep>,
    pub webhook_url: String,
}

impl FormTrigger {
    pub fn new(title: impl Into<String>, steps: Vec<PageStep>, webhook_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            steps,
            webhook_url: webhook_url.into(),
        }
    }

    pub fn handle(&self, request: &WebhookRequest, now: DateTime<Utc>) -> WebhookOutcome {
        match request.method.to_ascii_uppercase().as_str() {
            "GET" => {
                debug!("Serving form page '{}' ({} steps)", self.title, self.steps.len());
                WebhookOutcome::Respond(WebhookResponse::rendered(render_multistep_page(
                    &self.title,
                    &self.steps,
                    &self.webhook_url,
                )))
            }
            "POST" => {
                info!("Form '{}' submitted", self.title);
                WebhookOutcome::Workflow(json!({
                    "formData": request.body,
                    "timestamp": now.to_rfc3339_opts(SecondsFormat::Millis, true),
                    "webhookUrl": self.webhook_url,
                }))
            }
            other => {
                debug!("Rejecting {} request to form '{}'", other, self.title);
                WebhookOutcome::Respond(WebhookResponse::text(405, "Method Not Allowed"))
            }
        }
    }
}

/// Render the accumulated document posted under `form`.
///
/// A body without a document, or a document with no steps, is a 400.
pub fn finalize(request: &WebhookRequest) -> WebhookResponse {
    let document = request
        .body
        .get("form")
        .filter(|form| form.is_object())
        .map(FormDocument::from_value);

    match document {
        Some(document) if !document.steps.is_empty() => {
            debug!(
                "Rendering form '{}' with {} steps",
                document.name,
                document.steps.len()
            );
            WebhookResponse::rendered(render_form(&document))
        }
        _ => WebhookResponse::text(400, "No form data found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataverseError;
    use chrono::TimeZone;

    fn trigger() -> FormTrigger {
        FormTrigger::new(
            "Feedback",
            vec![PageStep {
                step_name: Some("Rating".to_string()),
                fields: Vec::new(),
            }],
            "https://hooks.test/feedback",
        )
    }

    #[test]
    fn test_get_serves_page() {
        let outcome = trigger().handle(&WebhookRequest::get(), Utc::now());
        let WebhookOutcome::Respond(response) = outcome else {
            panic!("expected a direct response");
        };
        assert_eq!(response.status, 200);
        assert_eq!(
            response.headers,
            vec![("Content-Type".to_string(), "text/html".to_string())]
        );
        assert!(response.body.contains("<h1>Feedback</h1>"));
    }

    #[test]
    fn test_post_starts_workflow() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let outcome = trigger().handle(&WebhookRequest::post(json!({"Score": "5"})), now);

        assert_eq!(
            outcome,
            WebhookOutcome::Workflow(json!({
                "formData": {"Score": "5"},
                "timestamp": "2024-03-01T09:30:00.000Z",
                "webhookUrl": "https://hooks.test/feedback"
            }))
        );
    }

    #[test]
    fn test_other_methods_are_rejected() {
        let outcome = trigger().handle(&WebhookRequest::new("DELETE", Value::Null), Utc::now());
        assert_eq!(
            outcome,
            WebhookOutcome::Respond(WebhookResponse::text(405, "Method Not Allowed"))
        );
    }

    #[test]
    fn test_finalize_renders_document() {
        let response = finalize(&WebhookRequest::post(json!({"form": {
            "name": "Signup",
            "steps": [{"name": "Account", "fields": [
                {"name": "email", "label": "Email", "type": "email", "required": true}
            ]}]
        }})));

        assert_eq!(response.status, 200);
        assert!(response.body.starts_with("<form action=\"/submit\" method=\"POST\">"));
        assert!(response.body.contains("<h2>Step 1: Account</h2>"));
    }

    #[test]
    fn test_finalize_without_steps_is_bad_request() {
        for body in [
            json!({}),
            json!({"form": {"name": "Empty", "steps": []}}),
            json!({"form": "text"}),
            Value::Null,
        ] {
            let response = finalize(&WebhookRequest::post(body));
            assert_eq!(response.status, 400);
            assert_eq!(response.body, "No form data found");
        }
    }

    #[test]
    fn test_render_failure_is_server_error() {
        let response =
            WebhookResponse::rendered(Err(DataverseError::render("template page.html unavailable")));
        assert_eq!(response.status, 500);
        assert!(response.headers.is_empty());
        assert_eq!(response.body, "Form could not be rendered");

        let response = WebhookResponse::rendered(Ok("<p>ok</p>".to_string()));
        assert_eq!(response, WebhookResponse::html(200, "<p>ok</p>".to_string()));
    }
}
