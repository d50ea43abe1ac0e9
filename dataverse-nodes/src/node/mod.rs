//! Dataverse node: operation selection and batch execution

pub mod operation;
pub mod parameters;
pub mod runner;

pub use operation::{Operation, QueryType};
pub use parameters::{JsonParameters, ParameterSource};
pub use runner::{ItemErrorInfo, ItemResult, NodeRunner, build_query, summarize};
