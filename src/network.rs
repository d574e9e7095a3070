//! Client for the companion bot network service.
//!
//! Every request carries the `x-api-key` header. Responses with status 200 or 201 are
//! parsed as JSON; anything else is an error. There is no retry.

use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::NetworkSettings;
use crate::utils::json_store::{self, JsonStoreError};

/// Errors that can occur while talking to the bot network.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Error during HTTP request communication, including non-2xx statuses.
    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),

    /// A 2xx status other than 200/201.
    #[error("Unexpected response status {0}")]
    UnexpectedStatus(StatusCode),

    /// The requested scope is absent from the bot's data document.
    #[error("Scope '{0}' is not present in the bot data")]
    MissingScope(DataScope),

    #[error("Unable to cache roles: {0}")]
    Cache(#[from] JsonStoreError),
}

/// Part of the bot data document to return from [`BotNetworkConnection::get_data`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataScope {
    /// The whole response document.
    Full,
    Version,
    StartupInfo,
    Roles,
    /// Any other key under `data`.
    Other(String),
}

impl DataScope {
    pub fn key(&self) -> &str {
        match self {
            DataScope::Full => "full",
            DataScope::Version => "version",
            DataScope::StartupInfo => "startup_info",
            DataScope::Roles => "roles",
            DataScope::Other(key) => key,
        }
    }

    /// Picks this scope out of a bot data document.
    pub fn extract(&self, document: Value) -> Option<Value> {
        let value = match self {
            DataScope::Full => Some(document),
            scope => match document {
                Value::Object(mut root) => match root.remove("data") {
                    Some(Value::Object(mut data)) => data.remove(scope.key()),
                    _ => None,
                },
                _ => None,
            },
        };
        value.filter(|value| !value.is_null())
    }
}

impl From<&str> for DataScope {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => DataScope::Full,
            "version" => DataScope::Version,
            "startup_info" => DataScope::StartupInfo,
            "roles" => DataScope::Roles,
            _ => DataScope::Other(s.trim().to_string()),
        }
    }
}

impl fmt::Display for DataScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Connection to the bot network service for one application.
#[derive(Debug, Clone)]
pub struct BotNetworkConnection {
    client: Client,
    base_url: String,
    api_key: String,
    application_id: String,
}

impl BotNetworkConnection {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        application_id: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            application_id: application_id.into(),
        }
    }

    pub fn from_settings(settings: &NetworkSettings) -> Self {
        Self::new(
            &settings.base_url,
            &settings.api_key,
            &settings.application_id,
        )
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn data_url(&self) -> String {
        self.url(&format!("/bots/data/{}", self.application_id))
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
    }

    async fn handle_response(response: Response) -> Result<Value, NetworkError> {
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
            status => match response.error_for_status() {
                Ok(_) => Err(NetworkError::UnexpectedStatus(status)),
                Err(e) => Err(NetworkError::Api(e)),
            },
        }
    }

    /// Fetches `/api/status`.
    pub async fn try_check_status(&self) -> Result<Value, NetworkError> {
        let response = self
            .request(reqwest::Method::GET, self.url("/status"))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetches `/api/status`, logging and returning `None` on failure.
    pub async fn check_status(&self) -> Option<Value> {
        match self.try_check_status().await {
            Ok(status) => {
                info!("BotNetworkConnection: connected");
                Some(status)
            }
            Err(NetworkError::Api(e)) if e.is_connect() => {
                error!(
                    "BotNetworkConnection: failed, is the bot network server running? {}",
                    e
                );
                None
            }
            Err(e) => {
                error!("BotNetworkConnection: failed: {}", e);
                None
            }
        }
    }

    /// Fetches the bot data document and extracts `scope` from it.
    pub async fn try_get_data(&self, scope: &DataScope) -> Result<Value, NetworkError> {
        debug!("Fetching '{}' data for application {}", scope, self.application_id);
        let response = self
            .request(reqwest::Method::GET, self.data_url())
            .send()
            .await?;
        let document = Self::handle_response(response).await?;

        scope
            .extract(document)
            .ok_or_else(|| NetworkError::MissingScope(scope.clone()))
    }

    /// Like [`Self::try_get_data`], but logs failures and returns `None`.
    pub async fn get_data(&self, scope: &DataScope) -> Option<Value> {
        match self.try_get_data(scope).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to fetch '{}' from the bot network: {}", scope, e);
                None
            }
        }
    }

    /// Fetches the published version as a display string.
    pub async fn version(&self) -> Option<String> {
        self.get_data(&DataScope::Version).await.map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    pub async fn create_data(&self, data: &Value) -> Result<Value, NetworkError> {
        let payload = json!({
            "applicationId": self.application_id,
            "data": data,
        });
        let response = self
            .request(reqwest::Method::POST, self.url("/bots/data"))
            .json(&payload)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn update_data(&self, data: &Value) -> Result<Value, NetworkError> {
        let response = self
            .request(reqwest::Method::PUT, self.data_url())
            .json(&json!({ "data": data }))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn delete_data(&self) -> Result<Value, NetworkError> {
        let response = self
            .request(reqwest::Method::DELETE, self.data_url())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetches the `roles` scope and writes it to `path`.
    ///
    /// Returns the fetched document so callers can refresh in-memory caches.
    pub async fn fetch_and_save_roles(&self, path: &Path) -> Result<Value, NetworkError> {
        let roles = self.try_get_data(&DataScope::Roles).await?;
        json_store::save_json(path, &roles)?;
        info!("Saved bot network roles to {}", path.display());
        Ok(roles)
    }
}
