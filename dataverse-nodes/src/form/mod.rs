//! Multi-step form builder
//!
//! A trigger seeds a [`FormDocument`], step nodes append to it with
//! [`append_step`], and the finalizer renders it with [`render_form`].

pub mod accumulator;
pub mod models;
pub mod page;
pub mod render;
pub mod templates;
pub mod webhook;

pub use accumulator::{append_step, step_inputs, trigger_document};
pub use models::{DEFAULT_FORM_NAME, FieldType, FormDocument, FormField, FormStep};
pub use page::{PageField, PageStep, parse_page_steps, render_multistep_page};
pub use render::{render_field, render_form};
pub use webhook::{FormTrigger, WebhookOutcome, WebhookRequest, WebhookResponse, finalize};
