//! Process settings read from the environment (optionally seeded from a `.env` file).

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::network::DataScope;

/// Placeholder shipped in template `.env` files.
pub const NO_TOKEN: &str = "NO_TOKEN_ADDED";

pub const DEFAULT_DATA_DIR: &str = "./data";

/// Errors raised while reading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' not found")]
    Missing(String),

    #[error("Environment variable '{key}' has an invalid value '{value}'")]
    Invalid { key: String, value: String },
}

/// Connection details for the companion bot network service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub base_url: String,
    pub api_key: String,
    pub application_id: String,
}

/// Connection details for MongoDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub connection_string: String,
    pub database_name: String,
}

/// Everything the bot reads from its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Discord bot token. `None` when unset.
    pub token: Option<String>,
    /// Whether the bot network connection is enabled.
    pub node_connection: bool,
    pub network: Option<NetworkSettings>,
    /// Data scopes fetched from the bot network during startup.
    pub default_scopes: Vec<DataScope>,
    pub database: Option<DatabaseSettings>,
    pub youtube_api_key: Option<String>,
    pub data_dir: PathBuf,
}

/// Loads a `.env` file. A missing file is not an error.
pub fn load_env(env_path: Option<&Path>) {
    let result = match env_path {
        Some(path) => dotenv::from_path(path).map(|_| path.to_path_buf()),
        None => dotenv::dotenv(),
    };

    match result {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let node_connection = match get("NODE_CONNECTION") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                key: "NODE_CONNECTION".to_string(),
                value,
            })?,
            None => true,
        };

        let network = if node_connection {
            let base_url = get("BNC_BASE_URL").ok_or(ConfigError::Missing("BNC_BASE_URL".into()))?;
            if Url::parse(&base_url).is_err() {
                return Err(ConfigError::Invalid {
                    key: "BNC_BASE_URL".to_string(),
                    value: base_url,
                });
            }

            Some(NetworkSettings {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: get("BNC_API_KEY").ok_or(ConfigError::Missing("BNC_API_KEY".into()))?,
                application_id: get("APPLICATION_ID")
                    .ok_or(ConfigError::Missing("APPLICATION_ID".into()))?,
            })
        } else {
            None
        };

        let default_scopes = match get("DEFAULT_SCOPES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|scope| !scope.is_empty())
                .map(DataScope::from)
                .collect(),
            None => vec![DataScope::Version],
        };

        // A database is optional; both halves must be present to use it.
        let database = match (get("CONNECTION_STRING"), get("DATABASE_NAME")) {
            (Some(connection_string), Some(database_name)) => Some(DatabaseSettings {
                connection_string,
                database_name,
            }),
            (Some(_), None) => {
                warn!("CONNECTION_STRING is set without DATABASE_NAME; database disabled");
                None
            }
            _ => None,
        };

        Ok(Self {
            token: get("TOKEN"),
            node_connection,
            network,
            default_scopes,
            database,
            youtube_api_key: get("YOUTUBE_API_KEY"),
            data_dir: get("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        })
    }

    pub fn ui_elements_path(&self) -> PathBuf {
        self.data_dir.join("ui_elements.json")
    }

    pub fn persistent_messages_path(&self) -> PathBuf {
        self.data_dir.join("persistent_messages.json")
    }

    pub fn roles_path(&self) -> PathBuf {
        self.data_dir.join("roles.json")
    }
}
