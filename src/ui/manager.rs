//! The UI handle shared through the framework data.
//!
//! Owns the configuration, the action registry and the persistence tracker, and routes
//! component and modal interactions to the registry.

use async_trait::async_trait;
use serenity::all::{
    ActionRowComponent, ChannelId, ComponentInteraction, ComponentInteractionDataKind, Context,
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, GuildId, Http, Message, ModalInteraction, RoleId, UserId,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

use super::UiError;
use super::actions::{ActionRegistry, Interactor};
use super::builder::{RenderedElement, build_modal};
use super::config::{ModalConfig, UiConfigStore};
use super::persistence::{MessageEditor, PersistenceTracker, PersistentMessageRecord, ReloadReport};
use crate::config::Settings;

pub const GENERIC_ERROR: &str = "Something went wrong while handling that interaction.";

pub struct UiManager {
    config: UiConfigStore,
    registry: ActionRegistry,
    persistence: PersistenceTracker,
}

impl UiManager {
    pub fn new(config: UiConfigStore, persistence: PersistenceTracker) -> Self {
        Self {
            config,
            registry: ActionRegistry::new(),
            persistence,
        }
    }

    /// Loads the element definitions and persistent records from the data directory.
    pub fn load(settings: &Settings) -> Self {
        Self::new(
            UiConfigStore::load(&settings.ui_elements_path()),
            PersistenceTracker::load(&settings.persistent_messages_path()),
        )
    }

    pub fn config(&self) -> &UiConfigStore {
        &self.config
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn persistence(&self) -> &PersistenceTracker {
        &self.persistence
    }

    /// Registers the actions and modals of every configured element.
    pub fn register_all(&self) -> usize {
        let mut registered = 0;
        for (guild_id, elements) in self.config.guilds() {
            for (name, element) in elements {
                let count = self.registry.register_element(guild_id, element);
                debug!("Registered {} ids for '{}' in guild {}", count, name, guild_id);
                registered += count;
            }
        }
        info!("Registered {} UI action ids", registered);
        registered
    }

    /// Renders an element. Fails when it is missing or renders nothing.
    pub fn render(&self, guild_id: GuildId, name: &str) -> Result<(RenderedElement, bool), UiError> {
        let element = self
            .config
            .element(guild_id, name)
            .ok_or_else(|| UiError::MissingElement {
                guild_id: guild_id.to_string(),
                name: name.to_string(),
            })?;

        let rendered = RenderedElement::render(element);
        if rendered.is_empty() {
            return Err(UiError::EmptyElement(name.to_string()));
        }
        Ok((rendered, element.persistent))
    }

    /// Sends an element to `channel_id`, tracking the message when the element is persistent.
    pub async fn send_element(
        &self,
        http: &Http,
        channel_id: ChannelId,
        guild_id: GuildId,
        name: &str,
        author_id: UserId,
    ) -> Result<Message, UiError> {
        let (rendered, persistent) = self.render(guild_id, name)?;
        let message = channel_id.send_message(http, rendered.to_message()).await?;

        if persistent {
            self.persistence.record(
                message.id,
                PersistentMessageRecord::new(channel_id, guild_id, name, author_id),
            )?;
        }
        Ok(message)
    }

    /// Runs the action of each id in turn.
    ///
    /// Errors never escape: they are logged and the user gets [`GENERIC_ERROR`].
    /// Returns whether any id was handled.
    pub async fn dispatch(&self, guild_id: GuildId, ids: &[String], interactor: &dyn Interactor) -> bool {
        let mut handled = false;
        for id in ids {
            match self.registry.execute(guild_id, id, interactor).await {
                Ok(ran) => handled |= ran,
                Err(e) => {
                    error!("Action '{}' failed in guild {}: {}", id, guild_id, e);
                    if let Err(e) = interactor.reply_ephemeral(GENERIC_ERROR).await {
                        error!("Unable to report failed action '{}': {}", id, e);
                    }
                    return true;
                }
            }
        }
        handled
    }

    pub async fn handle_component(&self, ctx: &Context, interaction: &ComponentInteraction) {
        let Some(guild_id) = interaction.guild_id else {
            debug!("Ignoring component '{}' outside a guild", interaction.data.custom_id);
            return;
        };
        let ids = dispatch_ids(&interaction.data.custom_id, &interaction.data.kind);
        let interactor = DiscordInteractor::new(ctx, Source::Component(interaction), guild_id);
        self.dispatch(guild_id, &ids, &interactor).await;
    }

    pub async fn handle_modal(&self, ctx: &Context, interaction: &ModalInteraction) {
        let Some(guild_id) = interaction.guild_id else {
            debug!("Ignoring modal '{}' outside a guild", interaction.data.custom_id);
            return;
        };
        let ids = vec![interaction.data.custom_id.clone()];
        let interactor = DiscordInteractor::new(ctx, Source::Modal(interaction), guild_id);
        self.dispatch(guild_id, &ids, &interactor).await;
    }

    /// Refreshes every tracked persistent message from the current configuration.
    pub async fn reload(&self, editor: &dyn MessageEditor) -> ReloadReport {
        self.persistence.reload(&self.config, editor).await
    }
}

/// The action ids a component interaction triggers.
///
/// A select triggers each selected value, or its own id when nothing was selected.
pub fn dispatch_ids(custom_id: &str, kind: &ComponentInteractionDataKind) -> Vec<String> {
    match kind {
        ComponentInteractionDataKind::StringSelect { values } if !values.is_empty() => {
            values.clone()
        }
        _ => vec![custom_id.to_string()],
    }
}

enum Source<'a> {
    Component(&'a ComponentInteraction),
    Modal(&'a ModalInteraction),
}

/// [`Interactor`] over a live component or modal interaction.
struct DiscordInteractor<'a> {
    ctx: &'a Context,
    source: Source<'a>,
    guild_id: GuildId,
    responded: AtomicBool,
}

impl<'a> DiscordInteractor<'a> {
    fn new(ctx: &'a Context, source: Source<'a>, guild_id: GuildId) -> Self {
        Self {
            ctx,
            source,
            guild_id,
            responded: AtomicBool::new(false),
        }
    }

    async fn respond(&self, response: CreateInteractionResponse) -> Result<(), UiError> {
        match self.source {
            Source::Component(interaction) => interaction.create_response(self.ctx, response).await?,
            Source::Modal(interaction) => interaction.create_response(self.ctx, response).await?,
        }
        Ok(())
    }

    async fn follow_up(&self, followup: CreateInteractionResponseFollowup) -> Result<(), UiError> {
        match self.source {
            Source::Component(interaction) => interaction.create_followup(self.ctx, followup).await?,
            Source::Modal(interaction) => interaction.create_followup(self.ctx, followup).await?,
        };
        Ok(())
    }
}

#[async_trait]
impl Interactor for DiscordInteractor<'_> {
    fn user_id(&self) -> UserId {
        match self.source {
            Source::Component(interaction) => interaction.user.id,
            Source::Modal(interaction) => interaction.user.id,
        }
    }

    async fn role_name(&self, role_id: RoleId) -> Option<String> {
        let cached = self
            .ctx
            .cache
            .guild(self.guild_id)
            .and_then(|guild| guild.roles.get(&role_id).map(|role| role.name.clone()));
        if cached.is_some() {
            return cached;
        }

        match self.guild_id.roles(&self.ctx.http).await {
            Ok(roles) => roles.get(&role_id).map(|role| role.name.clone()),
            Err(e) => {
                error!("Unable to fetch roles of guild {}: {}", self.guild_id, e);
                None
            }
        }
    }

    async fn add_role(&self, role_id: RoleId) -> Result<(), UiError> {
        self.ctx
            .http
            .add_member_role(self.guild_id, self.user_id(), role_id, Some("UI action"))
            .await?;
        Ok(())
    }

    async fn remove_role(&self, role_id: RoleId) -> Result<(), UiError> {
        self.ctx
            .http
            .remove_member_role(self.guild_id, self.user_id(), role_id, Some("UI action"))
            .await?;
        Ok(())
    }

    async fn reply_ephemeral(&self, content: &str) -> Result<(), UiError> {
        if self.responded.swap(true, Ordering::SeqCst) {
            return self
                .follow_up(
                    CreateInteractionResponseFollowup::new()
                        .content(content)
                        .ephemeral(true),
                )
                .await;
        }
        self.respond(CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true),
        ))
        .await
    }

    async fn open_modal(&self, modal: &ModalConfig) -> Result<(), UiError> {
        // Only the first response to a component may be a modal.
        if matches!(self.source, Source::Modal(_)) || self.responded.swap(true, Ordering::SeqCst) {
            return Err(UiError::ModalUnavailable);
        }
        self.respond(CreateInteractionResponse::Modal(build_modal(modal)))
            .await
    }

    fn submitted_values(&self) -> Vec<(String, String)> {
        let Source::Modal(interaction) = self.source else {
            return Vec::new();
        };
        interaction
            .data
            .components
            .iter()
            .flat_map(|row| row.components.iter())
            .filter_map(|component| match component {
                ActionRowComponent::InputText(input) => Some((
                    input.custom_id.clone(),
                    input.value.clone().unwrap_or_default(),
                )),
                _ => None,
            })
            .collect()
    }
}
