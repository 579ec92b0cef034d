//! Connection settings for the object storage service.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::{OfsError, Result};

/// Everything needed to authenticate and address the object store.
///
/// Immutable once handed to [`Client::new`](crate::Client::new).
#[derive(Debug, Clone)]
pub struct Credentials {
    /// API user name.
    pub username: String,
    /// API user password.
    pub password: SecretString,
    /// Tenant (project) identifier the token is scoped to.
    pub tenant_id: String,
    /// Token-issuing endpoint, e.g. `https://identity.example.com/v2.0/tokens`.
    pub token_url: String,
    /// Object storage account URL, e.g. `https://object-storage.example.com/v1/AUTH_abc`.
    pub storage_url: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        tenant_id: impl Into<String>,
        token_url: impl Into<String>,
        storage_url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            tenant_id: tenant_id.into(),
            token_url: token_url.into(),
            storage_url: storage_url.into(),
        }
    }

    /// Validate the settings without touching the network.
    ///
    /// # Errors
    /// Returns [`OfsError::Config`] for an empty field and
    /// [`OfsError::InvalidUrl`] for a URL that does not parse.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("username", self.username.as_str()),
            ("password", self.password.expose_secret()),
            ("tenant id", self.tenant_id.as_str()),
            ("token URL", self.token_url.as_str()),
            ("storage URL", self.storage_url.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(OfsError::Config(format!("{field} is empty")));
        }

        Url::parse(&self.token_url)
            .map_err(|e| OfsError::InvalidUrl(format!("token URL {:?}: {e}", self.token_url)))?;
        crate::uri::base_url(&self.storage_url)?;
        Ok(())
    }
}
