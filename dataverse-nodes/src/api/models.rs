//! Credential and token models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::constants::API_PATH;

/// Client-credentials configuration for one Dataverse environment
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Environment URL, e.g. `https://contoso.crm4.dynamics.com`
    pub resource_url: String,
}

impl CredentialSet {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        resource_url: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            resource_url: resource_url.into(),
        }
    }

    /// OAuth2 scope requested for the environment (`{resource}/.default`)
    pub fn scope(&self) -> String {
        format!("{}/.default", self.resource_url.trim_end_matches('/'))
    }

    /// Base URL of the Web API, without trailing slash
    pub fn api_base_url(&self) -> String {
        format!("{}{}", self.resource_url.trim_end_matches('/'), API_PATH)
    }
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("resource_url", &self.resource_url)
            .finish()
    }
}

/// Bearer token together with the instant it stops being usable
#[derive(Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
