//! Test doubles for the Discord side of UI interactions

use async_trait::async_trait;
use guildkit::ui::builder::RenderedElement;
use guildkit::ui::config::ModalConfig;
use guildkit::ui::persistence::MessageEditor;
use guildkit::ui::{Interactor, UiError};
use serenity::all::{ChannelId, MessageId, RoleId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// What an interaction did, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Reply(String),
    AddRole(RoleId),
    RemoveRole(RoleId),
    Modal(String),
}

/// Interactor that records effects instead of calling Discord
pub struct FakeInteraction {
    user: UserId,
    roles: HashMap<RoleId, String>,
    effects: Mutex<Vec<Effect>>,
}

impl FakeInteraction {
    pub fn new(user: u64) -> Self {
        Self {
            user: UserId::new(user),
            roles: HashMap::new(),
            effects: Mutex::new(Vec::new()),
        }
    }

    pub fn with_role(mut self, id: u64, name: &str) -> Self {
        self.roles.insert(RoleId::new(id), name.to_string());
        self
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap().clone()
    }

    fn push(&self, effect: Effect) {
        self.effects.lock().unwrap().push(effect);
    }
}

#[async_trait]
impl Interactor for FakeInteraction {
    fn user_id(&self) -> UserId {
        self.user
    }

    async fn role_name(&self, role_id: RoleId) -> Option<String> {
        self.roles.get(&role_id).cloned()
    }

    async fn add_role(&self, role_id: RoleId) -> Result<(), UiError> {
        self.push(Effect::AddRole(role_id));
        Ok(())
    }

    async fn remove_role(&self, role_id: RoleId) -> Result<(), UiError> {
        self.push(Effect::RemoveRole(role_id));
        Ok(())
    }

    async fn reply_ephemeral(&self, content: &str) -> Result<(), UiError> {
        self.push(Effect::Reply(content.to_string()));
        Ok(())
    }

    async fn open_modal(&self, modal: &ModalConfig) -> Result<(), UiError> {
        self.push(Effect::Modal(modal.custom_id.clone()));
        Ok(())
    }
}

/// Message editor whose deleted channels fail like Discord's "Unknown Channel"
#[derive(Default)]
pub struct FakeChannels {
    deleted: HashSet<ChannelId>,
    edited: Mutex<Vec<(ChannelId, MessageId, usize)>>,
}

impl FakeChannels {
    pub fn with_deleted(mut self, channel: u64) -> Self {
        self.deleted.insert(ChannelId::new(channel));
        self
    }

    /// `(channel, message, embed count)` of every successful edit
    pub fn edited(&self) -> Vec<(ChannelId, MessageId, usize)> {
        self.edited.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageEditor for FakeChannels {
    async fn refresh(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        rendered: &RenderedElement,
    ) -> Result<(), UiError> {
        if self.deleted.contains(&channel_id) {
            return Err(UiError::Discord(serenity::Error::Other("Unknown Channel")));
        }
        self.edited
            .lock()
            .unwrap()
            .push((channel_id, message_id, rendered.embeds.len()));
        Ok(())
    }
}
