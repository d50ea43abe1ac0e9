//! Dataverse Web API module
//!
//! Token management, request building and the client that ties them together.
//! Everything goes through one [`Transport`] so the whole stack can run
//! against a fake in tests.

pub mod auth;
pub mod client;
pub mod columns;
pub mod constants;
pub mod metadata;
pub mod models;
pub mod optionset;
pub mod pluralization;
pub mod query;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthContext, AuthManager, Clock, SystemClock};
pub use client::DataverseClient;
pub use columns::{ColumnValue, merge_body, parse_column_values};
pub use metadata::{ColumnInfo, MetadataCache, TableInfo};
pub use models::{CredentialSet, TokenInfo};
pub use optionset::{DecodedOptionSet, OptionEntry, OptionSetShape, decode_option_set};
pub use pluralization::pluralize_entity_name;
pub use query::{Query, extract_entity_name};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
