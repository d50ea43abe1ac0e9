//! HTML rendering of an accumulated form document

use minijinja::context;

use super::models::{FormDocument, FormField};
use super::templates::{FIELD_TEMPLATE, FORM_TEMPLATE, render};
use crate::error::Result;

/// Input element for one field
pub fn render_field(field: &FormField) -> Result<String> {
    render(FIELD_TEMPLATE, context! { field => field })
}

/// Render every step of the document, in order, as one HTML form.
pub fn render_form(document: &FormDocument) -> Result<String> {
    render(FORM_TEMPLATE, context! { steps => &document.steps })
}
