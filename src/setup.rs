//! Bot bootstrap: token validation, data directory, bot network preflight, the poise
//! framework and the client.

use poise::CreateReply;
use serde_json::Value;
use serenity::all::{ActivityData, ClientBuilder, GatewayIntents};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::checks::{RoleCache, format_cooldown};
use crate::config::{self, ConfigError, NO_TOKEN, Settings};
use crate::network::{BotNetworkConnection, DataScope};
use crate::ui::UiManager;
use crate::utils::time::{datetime_utc, format_datetime};
use crate::{Data, Error, events};

pub const GENERIC_COMMAND_ERROR: &str = "An unexpected error occurred while running this command.";

/// Errors that stop the bot from starting.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("NO_TOKEN_ADDED. Please add a valid token in environment secrets")]
    MissingToken,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unable to create data directory {path}: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Bot network connection failed, check the BNC_* environment variables")]
    NetworkUnavailable,

    #[error("Discord client failure: {0}")]
    Client(#[from] serenity::Error),
}

/// Rejects a missing, blank or placeholder token.
pub fn validate_token(token: Option<&str>) -> Result<&str, SetupError> {
    match token.map(str::trim) {
        Some(token) if !token.is_empty() && token != NO_TOKEN => Ok(token),
        _ => Err(SetupError::MissingToken),
    }
}

/// Activity text shown under the bot's name.
pub fn status_text(version: &str) -> String {
    format!("with v{}", version)
}

pub fn format_startup_info(version: &str, launched_at: &str, user: &str, elapsed: Duration) -> String {
    format!(
        "Launched with Version {} at {}\nLogged in as: {}\nElapsed time: {:.2}s\n",
        version,
        launched_at,
        user,
        elapsed.as_secs_f64()
    )
}

/// What the preflight fetched from the bot network, by scope key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preflight {
    pub status: Option<Value>,
    pub scopes: BTreeMap<String, Value>,
}

pub struct BotSetup {
    settings: Settings,
    network: Option<BotNetworkConnection>,
    started_at: Instant,
}

impl BotSetup {
    pub fn new(settings: Settings) -> Self {
        let network = settings.network.as_ref().map(BotNetworkConnection::from_settings);
        Self {
            settings,
            network,
            started_at: Instant::now(),
        }
    }

    /// Loads `.env` (from `env_path` or the working directory) and reads the settings.
    pub fn from_env(env_path: Option<&Path>) -> Result<Self, SetupError> {
        config::load_env(env_path);
        Ok(Self::new(Settings::from_env()?))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn network(&self) -> Option<&BotNetworkConnection> {
        self.network.as_ref()
    }

    pub fn prepare_data_dir(&self) -> Result<(), SetupError> {
        let path = &self.settings.data_dir;
        fs::create_dir_all(path).map_err(|source| SetupError::DataDir {
            path: path.display().to_string(),
            source,
        })
    }

    /// Checks the bot network and fetches the default scopes.
    ///
    /// The `roles` scope is written to `roles.json`. A disabled connection skips everything.
    pub async fn preflight(&self) -> Result<Preflight, SetupError> {
        let Some(network) = &self.network else {
            warn!("BotNetworkConnection is disabled. Features relying on it will not work.");
            return Ok(Preflight::default());
        };

        let status = network
            .check_status()
            .await
            .ok_or(SetupError::NetworkUnavailable)?;
        info!("Bot network status: {}", status);

        let mut scopes = BTreeMap::new();
        for scope in &self.settings.default_scopes {
            let fetched = match scope {
                DataScope::Roles => match network.fetch_and_save_roles(&self.settings.roles_path()).await {
                    Ok(roles) => Some(roles),
                    Err(e) => {
                        warn!("Roles fetch failed, role checks will deny until roles.json exists: {}", e);
                        None
                    }
                },
                scope => network.get_data(scope).await,
            };
            if let Some(value) = fetched {
                scopes.insert(scope.key().to_string(), value);
            }
        }

        Ok(Preflight {
            status: Some(status),
            scopes,
        })
    }

    pub async fn version(&self) -> Option<String> {
        match &self.network {
            Some(network) => network.version().await,
            None => None,
        }
    }

    pub async fn startup_info(&self, user: &str) -> String {
        let version = self.version().await.unwrap_or_else(|| "N/A".to_string());
        format_startup_info(
            &version,
            &format_datetime(&datetime_utc()),
            user,
            self.started_at.elapsed(),
        )
    }

    /// Shows "Playing with v{version}". Returns `false` when no version is available.
    pub async fn set_status(&self, ctx: &serenity::all::Context) -> bool {
        if self.network.is_none() {
            info!("BotNetworkConnection is disabled, bot status will not be set");
            return false;
        }
        match self.version().await {
            Some(version) => {
                ctx.set_activity(Some(ActivityData::playing(status_text(&version))));
                true
            }
            None => {
                warn!("No version available, bot status not set");
                false
            }
        }
    }

    /// Builds the shared data and registers every configured UI action.
    pub fn build_data(&self) -> Data {
        let ui = UiManager::load(&self.settings);
        ui.register_all();

        Data {
            ui,
            roles: RoleCache::load(&self.settings.roles_path()),
            network: self.network.clone(),
            #[cfg(feature = "mongo")]
            database: self.settings.database.as_ref().map(|db| {
                tokio::sync::Mutex::new(crate::database::MongoConnection::from_settings(db, None))
            }),
            #[cfg(feature = "youtube")]
            youtube: self
                .settings
                .youtube_api_key
                .as_ref()
                .map(crate::youtube::YouTubeClient::new),
            started_at: self.started_at,
            settings: self.settings.clone(),
        }
    }

    pub fn framework(self, commands: Vec<poise::Command<Data, Error>>) -> poise::Framework<Data, Error> {
        poise::Framework::builder()
            .options(poise::FrameworkOptions {
                commands,
                prefix_options: poise::PrefixFrameworkOptions {
                    prefix: Some("!".into()),
                    ..Default::default()
                },
                on_error: |error| Box::pin(on_error(error)),
                event_handler: |ctx, event, framework, data| {
                    Box::pin(events::event_handler(ctx, event, framework, data))
                },
                ..Default::default()
            })
            .setup(move |ctx, ready, framework| {
                Box::pin(async move {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                    let data = self.build_data();
                    let report = data.ui.reload(&*ctx.http).await;
                    if !report.skipped.is_empty() {
                        warn!(
                            "{} persistent messages could not be refreshed: {:?}",
                            report.skipped.len(),
                            report.skipped
                        );
                    }

                    self.set_status(ctx).await;
                    info!("{}", self.startup_info(&ready.user.name).await);
                    Ok(data)
                })
            })
            .build()
    }

    /// Validates the token, prepares the data directory, runs the preflight and starts the
    /// client. Returns when the client stops.
    pub async fn run(self, commands: Vec<poise::Command<Data, Error>>) -> Result<(), SetupError> {
        let token = validate_token(self.settings.token.as_deref())?.to_string();
        self.prepare_data_dir()?;
        self.preflight().await?;

        let intents = GatewayIntents::non_privileged()
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_PRESENCES;

        let framework = self.framework(commands);
        let mut client = ClientBuilder::new(token, intents)
            .framework(framework)
            .await?;

        client.start().await.map_err(|e| {
            error!("Client failed to run, possibly an invalid token: {}", e);
            SetupError::Client(e)
        })
    }
}

/// Renders framework errors as ephemeral replies.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let reply = CreateReply::default()
                .content(format_cooldown(remaining_cooldown))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Unable to send cooldown notice: {}", e);
            }
        }
        // The check already answered the user.
        poise::FrameworkError::CommandCheckFailed { error: None, .. } => {}
        poise::FrameworkError::CommandCheckFailed {
            error: Some(error),
            ctx,
            ..
        }
        | poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                "Command '{}' failed: {}",
                ctx.command().qualified_name,
                error
            );
            let reply = CreateReply::default()
                .content(GENERIC_COMMAND_ERROR)
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Unable to report command failure: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
