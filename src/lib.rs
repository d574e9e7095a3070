//! Helpers for building Discord bots on poise and serenity.
//!
//! Bootstrap, a bot network REST client, a MongoDB helper, role checks and a UI builder
//! driven by JSON element definitions.

use std::time::Instant;

pub mod checks;
pub mod commands;
pub mod config;
#[cfg(feature = "mongo")]
pub mod database;
pub mod events;
pub mod network;
pub mod setup;
pub mod ui;
pub mod utils;
#[cfg(feature = "youtube")]
pub mod youtube;

use checks::RoleCache;
use config::Settings;
use network::BotNetworkConnection;
use ui::UiManager;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Shared state handed to every command and event.
pub struct Data {
    pub settings: Settings,
    pub ui: UiManager,
    pub roles: RoleCache,
    /// `None` when `NODE_CONNECTION` is disabled.
    pub network: Option<BotNetworkConnection>,
    #[cfg(feature = "mongo")]
    pub database: Option<tokio::sync::Mutex<database::MongoConnection>>,
    #[cfg(feature = "youtube")]
    pub youtube: Option<youtube::YouTubeClient>,
    pub started_at: Instant,
}
