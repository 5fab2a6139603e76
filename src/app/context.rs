use std::sync::Arc;

use crate::app::error::{FreshetError, Result};
use crate::config::Config;
use crate::reader::ReaderClient;
use crate::secrets::{self, Credentials, KeychainStore, SecretStore};

/// Wires configuration and the credential store together, and builds API
/// clients from whatever is currently stored.
pub struct AppContext {
    pub config: Config,
    pub secrets: Arc<dyn SecretStore>,
}

impl AppContext {
    pub fn new() -> Result<Self> {
        Ok(Self {
            config: Config::load()?,
            secrets: Arc::new(KeychainStore::new()),
        })
    }

    pub fn with_secrets(config: Config, secrets: Arc<dyn SecretStore>) -> Self {
        Self { config, secrets }
    }

    /// Stored credentials, or `MissingCredentials` when any key is absent.
    pub fn credentials(&self) -> Result<Credentials> {
        secrets::load_credentials(self.secrets.as_ref())?.ok_or(FreshetError::MissingCredentials)
    }

    /// Build an API client from the stored credentials.
    pub fn reader_client(&self) -> Result<ReaderClient> {
        let credentials = self.credentials()?;
        self.client_for(&credentials)
    }

    /// Build an API client for explicit credentials. Used by setup, which
    /// tests a connection before anything is stored.
    pub fn client_for(&self, credentials: &Credentials) -> Result<ReaderClient> {
        ReaderClient::new(
            &credentials.api_url,
            &credentials.username,
            &credentials.password,
            self.config.request_timeout(),
            &self.config.user_agent,
        )
    }
}
