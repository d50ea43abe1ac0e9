//! Connector configuration
//!
//! Settings come from an optional TOML file, by default
//! `~/.config/dataverse-nodes/config.toml`, and are then overridden by
//! `DATAVERSE_*` environment variables (a `.env` file is loaded by the binary
//! before this runs).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::api::constants::DEFAULT_AUTHORITY;
use crate::api::{AuthManager, CredentialSet, DataverseClient, MetadataCache, ReqwestTransport};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_TENANT_ID: &str = "DATAVERSE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "DATAVERSE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "DATAVERSE_CLIENT_SECRET";
pub const ENV_RESOURCE_URL: &str = "DATAVERSE_RESOURCE_URL";
pub const ENV_AUTHORITY: &str = "DATAVERSE_AUTHORITY";
pub const ENV_TIMEOUT_SECS: &str = "DATAVERSE_TIMEOUT_SECS";

/// On-disk shape; every key is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct FileConfig {
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    resource_url: Option<String>,
    authority: Option<String>,
    timeout_secs: Option<u64>,
    cache_metadata: Option<bool>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub resource_url: Option<String>,
    /// Azure AD host the token endpoint lives under
    pub authority: String,
    pub timeout_secs: u64,
    /// Memoize table and column listings for the life of the client
    pub cache_metadata: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_secret: None,
            resource_url: None,
            authority: DEFAULT_AUTHORITY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_metadata: true,
        }
    }
}

impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("resource_url", &self.resource_url)
            .field("authority", &self.authority)
            .field("timeout_secs", &self.timeout_secs)
            .field("cache_metadata", &self.cache_metadata)
            .finish()
    }
}

/// `~/.config/dataverse-nodes/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dataverse-nodes").join("config.toml"))
}

impl ConnectorConfig {
    pub fn builder() -> ConnectorConfigBuilder {
        ConnectorConfigBuilder::new()
    }

    /// Load from `path` (or the default location) and apply the environment.
    ///
    /// An explicit path must exist; the default one may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content).context("Failed to parse TOML")?;
        let defaults = Self::default();
        Ok(Self {
            tenant_id: file.tenant_id,
            client_id: file.client_id,
            client_secret: file.client_secret,
            resource_url: file.resource_url,
            authority: file.authority.unwrap_or(defaults.authority),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
            cache_metadata: file.cache_metadata.unwrap_or(defaults.cache_metadata),
        })
    }

    /// Override settings with whatever `lookup` finds; blank values are ignored
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_TENANT_ID) {
            self.tenant_id = Some(v);
        }
        if let Some(v) = get(ENV_CLIENT_ID) {
            self.client_id = Some(v);
        }
        if let Some(v) = get(ENV_CLIENT_SECRET) {
            self.client_secret = Some(v);
        }
        if let Some(v) = get(ENV_RESOURCE_URL) {
            self.resource_url = Some(v);
        }
        if let Some(v) = get(ENV_AUTHORITY) {
            self.authority = v;
        }
        if let Some(v) = get(ENV_TIMEOUT_SECS) {
            self.timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, v))?;
        }

        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Credentials for the token manager; every field must be present
    pub fn credentials(&self) -> Result<CredentialSet> {
        let missing: Vec<&str> = [
            ("tenant_id", &self.tenant_id, ENV_TENANT_ID),
            ("client_id", &self.client_id, ENV_CLIENT_ID),
            ("client_secret", &self.client_secret, ENV_CLIENT_SECRET),
            ("resource_url", &self.resource_url, ENV_RESOURCE_URL),
        ]
        .into_iter()
        .filter(|(_, value, _)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(_, _, env)| env)
        .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "Missing Dataverse credentials: set {} or add them to the config file",
                missing.join(", ")
            );
        }

        Ok(CredentialSet::new(
            self.tenant_id.clone().unwrap_or_default(),
            self.client_id.clone().unwrap_or_default(),
            self.client_secret.clone().unwrap_or_default(),
            self.resource_url.clone().unwrap_or_default(),
        ))
    }

    /// Client wired with a reqwest transport and, if enabled, a fresh cache
    pub fn client(&self) -> Result<DataverseClient> {
        let credentials = self.credentials()?;
        let transport = Arc::new(
            ReqwestTransport::new(self.timeout()).context("Failed to create HTTP transport")?,
        );
        let auth = AuthManager::new(credentials, transport.clone()).with_authority(&self.authority);

        let client = DataverseClient::with_auth(auth, transport);
        Ok(if self.cache_metadata {
            client.with_cache(Arc::new(MetadataCache::new()))
        } else {
            client
        })
    }
}

/// Builder for [`ConnectorConfig`]
#[derive(Debug, Default)]
pub struct ConnectorConfigBuilder {
    config: ConnectorConfig,
}

impl ConnectorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(mut self, credentials: CredentialSet) -> Self {
        self.config.tenant_id = Some(credentials.tenant_id);
        self.config.client_id = Some(credentials.client_id);
        self.config.client_secret = Some(credentials.client_secret);
        self.config.resource_url = Some(credentials.resource_url);
        self
    }

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.config.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.config.client_secret = Some(client_secret.into());
        self
    }

    pub fn resource_url(mut self, resource_url: impl Into<String>) -> Self {
        self.config.resource_url = Some(resource_url.into());
        self
    }

    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.config.authority = authority.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn cache_metadata(mut self, enabled: bool) -> Self {
        self.config.cache_metadata = enabled;
        self
    }

    pub fn build(self) -> ConnectorConfig {
        self.config
    }
}
