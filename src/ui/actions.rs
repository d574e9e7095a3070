//! Guild-scoped action registry.
//!
//! A component's `custom_id` is looked up in its guild's scope and the registered
//! [`ActionHandler`] runs against an [`Interactor`]. Unknown ids are ignored.

use async_trait::async_trait;
use dashmap::DashMap;
use serenity::all::{GuildId, RoleId, UserId};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::UiError;
use super::config::{ActionConfig, ModalConfig, UiElement};

pub const DEFAULT_ACTION_MESSAGE: &str = "Action completed!";
pub const DEFAULT_SUBMIT_MESSAGE: &str = "Submission received!";

/// The side of an interaction an action can act on.
#[async_trait]
pub trait Interactor: Send + Sync {
    /// The user who triggered the interaction.
    fn user_id(&self) -> UserId;

    /// Name of `role_id` in the interaction's guild, or `None` if the role does not exist.
    async fn role_name(&self, role_id: RoleId) -> Option<String>;

    async fn add_role(&self, role_id: RoleId) -> Result<(), UiError>;

    async fn remove_role(&self, role_id: RoleId) -> Result<(), UiError>;

    /// Replies privately. A second reply to the same interaction becomes a follow-up.
    async fn reply_ephemeral(&self, content: &str) -> Result<(), UiError>;

    async fn open_modal(&self, modal: &ModalConfig) -> Result<(), UiError>;

    /// `(field custom_id, value)` pairs of a submitted modal.
    fn submitted_values(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Something that runs when a registered custom id is triggered.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn run(&self, interaction: &dyn Interactor) -> Result<(), UiError>;
}

/// Configured actions, resolved against their element.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Message {
        message: Option<String>,
    },
    AddRole {
        role_id: RoleId,
        response: Option<String>,
    },
    RemoveRole {
        role_id: RoleId,
        response: Option<String>,
    },
    OpenModal(ModalConfig),
    /// Registered under a modal's own id to answer its submission.
    AcknowledgeModal {
        response: Option<String>,
    },
}

impl Action {
    /// Resolves an action description to its custom id and runnable action.
    ///
    /// Returns `None` for unknown action types and for modal actions whose modal is not
    /// defined on `element`.
    pub fn from_config(config: &ActionConfig, element: &UiElement) -> Option<(String, Action)> {
        let resolved = match config {
            ActionConfig::Message { custom_id, message } => (
                custom_id.clone(),
                Action::Message {
                    message: message.clone(),
                },
            ),
            ActionConfig::AddRole {
                custom_id,
                role_id,
                response,
            } => (
                custom_id.clone(),
                Action::AddRole {
                    role_id: *role_id,
                    response: response.clone(),
                },
            ),
            ActionConfig::RemoveRole {
                custom_id,
                role_id,
                response,
            } => (
                custom_id.clone(),
                Action::RemoveRole {
                    role_id: *role_id,
                    response: response.clone(),
                },
            ),
            ActionConfig::Modal {
                custom_id,
                modal_id,
            } => {
                let modal_id = modal_id.as_deref().unwrap_or(custom_id);
                match element.modal(modal_id) {
                    Some(modal) => (custom_id.clone(), Action::OpenModal(modal.clone())),
                    None => {
                        warn!(
                            "Action '{}' opens undefined modal '{}', skipping",
                            custom_id, modal_id
                        );
                        return None;
                    }
                }
            }
            ActionConfig::Unknown => return None,
        };
        Some(resolved)
    }
}

#[async_trait]
impl ActionHandler for Action {
    async fn run(&self, interaction: &dyn Interactor) -> Result<(), UiError> {
        match self {
            Action::Message { message } => {
                interaction
                    .reply_ephemeral(message.as_deref().unwrap_or(DEFAULT_ACTION_MESSAGE))
                    .await
            }
            Action::AddRole { role_id, response } => {
                // A role deleted since the config was written is a no-op.
                let Some(name) = interaction.role_name(*role_id).await else {
                    warn!("Role {} no longer exists, nothing to add", role_id);
                    return Ok(());
                };
                interaction.add_role(*role_id).await?;
                info!("Added role {} to user {}", name, interaction.user_id());
                let reply = response
                    .clone()
                    .unwrap_or_else(|| format!("Role {} added!", name));
                interaction.reply_ephemeral(&reply).await
            }
            Action::RemoveRole { role_id, response } => {
                let Some(name) = interaction.role_name(*role_id).await else {
                    warn!("Role {} no longer exists, nothing to remove", role_id);
                    return Ok(());
                };
                interaction.remove_role(*role_id).await?;
                info!("Removed role {} from user {}", name, interaction.user_id());
                let reply = response
                    .clone()
                    .unwrap_or_else(|| format!("Role {} removed!", name));
                interaction.reply_ephemeral(&reply).await
            }
            Action::OpenModal(modal) => interaction.open_modal(modal).await,
            Action::AcknowledgeModal { response } => {
                for (field, value) in interaction.submitted_values() {
                    debug!(
                        "Modal field '{}' from user {}: {}",
                        field,
                        interaction.user_id(),
                        value
                    );
                }
                interaction
                    .reply_ephemeral(response.as_deref().unwrap_or(DEFAULT_SUBMIT_MESSAGE))
                    .await
            }
        }
    }
}

/// Handlers keyed by `(guild, custom_id)`. The last registration for a key wins.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: DashMap<(GuildId, String), Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `custom_id` in `guild`, replacing any earlier handler.
    ///
    /// Returns `true` when an earlier handler was replaced.
    pub fn register<H>(&self, guild: GuildId, custom_id: impl Into<String>, handler: H) -> bool
    where
        H: ActionHandler + 'static,
    {
        self.register_arc(guild, custom_id, Arc::new(handler))
    }

    pub fn register_arc(
        &self,
        guild: GuildId,
        custom_id: impl Into<String>,
        handler: Arc<dyn ActionHandler>,
    ) -> bool {
        let custom_id = custom_id.into();
        let replaced = self.handlers.insert((guild, custom_id.clone()), handler);
        if replaced.is_some() {
            debug!("Replaced action '{}' in guild {}", custom_id, guild);
        }
        replaced.is_some()
    }

    /// Registers every action and modal of `element`. Returns the number of ids registered.
    pub fn register_element(&self, guild: GuildId, element: &UiElement) -> usize {
        let mut registered = 0;

        // Explicit actions are registered last so they win over a modal with the same id.
        for modal in &element.modals {
            self.register(
                guild,
                modal.custom_id.clone(),
                Action::AcknowledgeModal {
                    response: modal.response.clone(),
                },
            );
            registered += 1;
        }

        for config in &element.actions {
            if let Some((custom_id, action)) = Action::from_config(config, element) {
                self.register(guild, custom_id, action);
                registered += 1;
            }
        }

        registered
    }

    /// Runs the handler registered for `custom_id` in `guild`.
    ///
    /// Returns `Ok(false)` without touching the interaction when nothing is registered.
    pub async fn execute(
        &self,
        guild: GuildId,
        custom_id: &str,
        interaction: &dyn Interactor,
    ) -> Result<bool, UiError> {
        let handler = match self.handlers.get(&(guild, custom_id.to_string())) {
            Some(entry) => Arc::clone(entry.value()),
            None => {
                debug!("No action '{}' registered in guild {}", custom_id, guild);
                return Ok(false);
            }
        };

        handler.run(interaction).await?;
        Ok(true)
    }

    pub fn contains(&self, guild: GuildId, custom_id: &str) -> bool {
        self.handlers.contains_key(&(guild, custom_id.to_string()))
    }

    /// Drops every registration of `guild`.
    pub fn clear_guild(&self, guild: GuildId) {
        self.handlers.retain(|(scope, _), _| *scope != guild);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
