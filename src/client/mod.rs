pub mod auth;
pub mod query;

use std::sync::Arc;

use crate::config::{BackendSettings, QueryConfig, NOT_CONFIGURED};
use crate::error::DataError;
use auth::AuthClient;
use query::TableQuery;

/// Handle to the hosted data backend (table CRUD plus auth/session API).
///
/// Cheap to clone; all clones share the HTTP connection pool and the
/// session store. An unconfigured handle constructs fine, but every data
/// call through it fails with a fixed remediation message before any
/// network I/O — only the account resolver's degraded mode bypasses this.
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    settings: Arc<BackendSettings>,
    config: QueryConfig,
    auth: AuthClient,
}

impl RemoteClient {
    pub fn new(settings: BackendSettings, config: QueryConfig) -> Self {
        let http = reqwest::Client::new();
        let settings = Arc::new(settings);
        let auth = AuthClient::new(http.clone(), settings.clone(), config.clone());
        Self {
            http,
            settings,
            config,
            auth,
        }
    }

    /// Process-default handle built from environment settings.
    pub fn from_env() -> Self {
        Self::new(
            crate::config::settings().clone(),
            crate::config::query_config().clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Start a request against one table.
    pub fn from(&self, table: &str) -> TableQuery {
        TableQuery::new(self.clone(), table)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn rest_url(&self, table: &str) -> Result<String, DataError> {
        let base = self
            .settings
            .url
            .as_deref()
            .ok_or(DataError::Configuration(NOT_CONFIGURED))?;
        Ok(format!("{}/rest/v1/{}", base, table))
    }

    pub(crate) fn anon_key(&self) -> Result<&str, DataError> {
        self.settings
            .anon_key
            .as_deref()
            .ok_or(DataError::Configuration(NOT_CONFIGURED))
    }

    /// Bearer credential for data requests: the signed-in session's access
    /// token when present, the anonymous key otherwise.
    pub(crate) fn bearer(&self) -> Result<String, DataError> {
        if let Some(session) = self.auth.session() {
            return Ok(session.access_token);
        }
        Ok(self.anon_key()?.to_string())
    }
}
