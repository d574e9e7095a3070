//! Configuration-driven UI: JSON element definitions, the guild-scoped action registry,
//! component building, persistent-message tracking and read-only info panels.

pub mod actions;
pub mod builder;
pub mod config;
pub mod confirm;
pub mod embeds;
pub mod manager;
pub mod persistence;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

use crate::utils::json_store::JsonStoreError;

pub use actions::{Action, ActionHandler, ActionRegistry, Interactor};
pub use config::{UiConfigStore, UiElement};
pub use manager::UiManager;
pub use persistence::{PersistenceTracker, PersistentMessageRecord, ReloadReport};

/// Errors raised while rendering or dispatching UI elements.
#[derive(Error, Debug)]
pub enum UiError {
    #[error("Discord API error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("This interaction did not come from a guild")]
    NotInGuild,

    #[error("A modal cannot be opened from this interaction")]
    ModalUnavailable,

    #[error("Persistence failure: {0}")]
    Store(#[from] JsonStoreError),

    #[error("Invalid persistent message record: {0}")]
    InvalidRecord(String),

    #[error("No UI element '{name}' configured for guild {guild_id}")]
    MissingElement { guild_id: String, name: String },

    #[error("UI element '{0}' renders nothing")]
    EmptyElement(String),
}
