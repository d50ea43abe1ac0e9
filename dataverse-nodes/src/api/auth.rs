//! OAuth2 client-credentials authentication against Azure AD
//!
//! [`AuthManager`] owns the token for one credential set. The token is
//! requested lazily and reused until `now >= expires_at`, at which point the
//! next call transparently requests a new one. There is no refresh token and
//! no revocation: expiry is purely a timestamp comparison.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::constants::{DEFAULT_AUTHORITY, DEFAULT_TOKEN_LIFETIME_SECS};
use super::models::{CredentialSet, TokenInfo};
use super::transport::Transport;
use crate::error::{DataverseError, Result};

/// Source of "now", injectable so token expiry can be tested
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Credentials plus the token they produced
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub credentials: CredentialSet,
    pub token: TokenInfo,
}

impl AuthContext {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_expired_at(now)
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.access_token)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<Value>,
}

/// `expires_in` arrives as a number from v2.0 endpoints and as a string from
/// some proxies; anything else, including a non-positive value, falls back to
/// the default lifetime
fn parse_expires_in(value: Option<&Value>) -> i64 {
    let lifetime = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    lifetime
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
}

/// Expiry instant `lifetime` seconds after `now`, with the lifetime actually
/// applied. A lifetime past chrono's range falls back to the default.
fn expiry_after(now: DateTime<Utc>, lifetime: i64) -> (DateTime<Utc>, i64) {
    Duration::try_seconds(lifetime)
        .and_then(|delta| now.checked_add_signed(delta))
        .map(|expires_at| (expires_at, lifetime))
        .unwrap_or_else(|| {
            warn!(
                "Token lifetime of {}s is out of range, using {}s",
                lifetime, DEFAULT_TOKEN_LIFETIME_SECS
            );
            (
                now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS),
                DEFAULT_TOKEN_LIFETIME_SECS,
            )
        })
}

/// Token manager for a single credential set
#[derive(Debug)]
pub struct AuthManager {
    credentials: CredentialSet,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    authority: String,
    context: Mutex<Option<AuthContext>>,
}

impl AuthManager {
    pub fn new(credentials: CredentialSet, transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials,
            transport,
            clock: Arc::new(SystemClock),
            authority: DEFAULT_AUTHORITY.to_string(),
            context: Mutex::new(None),
        }
    }

    /// Replace the clock used for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Point token requests at a different authority host
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into().trim_end_matches('/').to_string();
        self
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn token_url(&self, tenant_id: &str) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority, tenant_id)
    }

    /// Request a fresh token for `credentials`, ignoring anything cached
    pub async fn authenticate(&self, credentials: &CredentialSet) -> Result<AuthContext> {
        let url = self.token_url(&credentials.tenant_id);
        let scope = credentials.scope();

        debug!(
            "Requesting token for client {} in tenant {}",
            credentials.client_id, credentials.tenant_id
        );

        let response = self
            .transport
            .post_form(
                &url,
                &[
                    ("grant_type", "client_credentials"),
                    ("client_id", credentials.client_id.as_str()),
                    ("client_secret", credentials.client_secret.as_str()),
                    ("scope", scope.as_str()),
                ],
            )
            .await
            .map_err(|e| DataverseError::auth(format!("token request to {} failed: {}", url, e)))?;

        if !response.is_success() {
            return Err(DataverseError::auth(format!(
                "token endpoint returned {} {}: {}",
                response.status, response.status_text, response.body
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            DataverseError::auth(format!("token response is not valid JSON: {}", e))
        })?;

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DataverseError::auth("token response does not contain access_token"))?;

        let (expires_at, lifetime) =
            expiry_after(self.clock.now(), parse_expires_in(parsed.expires_in.as_ref()));

        info!(
            "Acquired token for tenant {} (valid for {}s)",
            credentials.tenant_id, lifetime
        );

        Ok(AuthContext {
            credentials: credentials.clone(),
            token: TokenInfo {
                access_token,
                expires_at,
            },
        })
    }

    /// Return `context` unchanged while it is valid, otherwise re-authenticate
    /// with the credentials it carries
    pub async fn ensure_valid(&self, context: AuthContext) -> Result<AuthContext> {
        if context.is_valid_at(self.clock.now()) {
            return Ok(context);
        }
        debug!("Token expired at {}, re-authenticating", context.token.expires_at);
        self.authenticate(&context.credentials).await
    }

    /// Current valid context, authenticating on first use or after expiry.
    /// Called before every outbound API request.
    pub async fn context(&self) -> Result<AuthContext> {
        let mut guard = self.context.lock().await;
        let fresh = match guard.take() {
            Some(existing) => self.ensure_valid(existing).await?,
            None => self.authenticate(&self.credentials).await?,
        };
        *guard = Some(fresh.clone());
        Ok(fresh)
    }

    /// `Authorization` header value for the next request
    pub async fn bearer(&self) -> Result<String> {
        Ok(self.context().await?.bearer())
    }

    /// Drop the cached token so the next call authenticates again
    pub async fn invalidate(&self) {
        *self.context.lock().await = None;
    }
}
