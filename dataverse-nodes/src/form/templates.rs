//! HTML templates for the finalizer form and the multi-step page
//!
//! Template names end in `.html`, so minijinja escapes every interpolated
//! value.

use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{DataverseError, Result};

pub const FIELD_TEMPLATE: &str = "field.html";
pub const FORM_TEMPLATE: &str = "form.html";
pub const PAGE_TEMPLATE: &str = "page.html";

const SOURCES: &[(&str, &str)] = &[
    (FIELD_TEMPLATE, include_str!("templates/field.html")),
    (FORM_TEMPLATE, include_str!("templates/form.html")),
    (PAGE_TEMPLATE, include_str!("templates/page.html")),
];

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for &(name, source) in SOURCES {
        // A broken template surfaces as a render error on first use
        if let Err(e) = env.add_template(name, source) {
            log::error!("Failed to load template {}: {}", name, e);
        }
    }
    env
});

/// Render a built-in template with `context`
pub fn render<S: Serialize>(name: &str, context: S) -> Result<String> {
    let template = TEMPLATES
        .get_template(name)
        .map_err(|e| DataverseError::render(format!("template {} unavailable: {}", name, e)))?;
    template
        .render(context)
        .map_err(|e| DataverseError::render(format!("failed to render {}: {}", name, e)))
}
