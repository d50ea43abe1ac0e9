//! Dataverse connector and multi-step form nodes
//!
//! [`api`] talks to the Dataverse Web API, [`node`] runs its operations over
//! batches of items, and [`form`] builds and renders multi-step forms.

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod node;

pub use error::{DataverseError, ItemError, Result};
