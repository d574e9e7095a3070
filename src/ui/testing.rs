//! In-memory [`Interactor`] used by the UI tests.

use async_trait::async_trait;
use serenity::all::{RoleId, UserId};
use std::collections::HashMap;
use std::sync::Mutex;

use super::UiError;
use super::actions::Interactor;
use super::config::ModalConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Reply(String),
    AddRole(RoleId),
    RemoveRole(RoleId),
    Modal(String),
}

pub struct RecordingInteractor {
    user: UserId,
    roles: HashMap<RoleId, String>,
    values: Vec<(String, String)>,
    fail_roles: bool,
    events: Mutex<Vec<Event>>,
}

impl RecordingInteractor {
    pub fn new() -> Self {
        Self {
            user: UserId::new(1),
            roles: HashMap::new(),
            values: Vec::new(),
            fail_roles: false,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_role(mut self, role_id: RoleId, name: &str) -> Self {
        self.roles.insert(role_id, name.to_string());
        self
    }

    pub fn with_values(mut self, values: &[(&str, &str)]) -> Self {
        self.values = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    /// Role changes fail as if the bot lacked permissions.
    pub fn failing_roles(mut self) -> Self {
        self.fail_roles = true;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Interactor for RecordingInteractor {
    fn user_id(&self) -> UserId {
        self.user
    }

    async fn role_name(&self, role_id: RoleId) -> Option<String> {
        self.roles.get(&role_id).cloned()
    }

    async fn add_role(&self, role_id: RoleId) -> Result<(), UiError> {
        if self.fail_roles {
            return Err(UiError::NotInGuild);
        }
        self.push(Event::AddRole(role_id));
        Ok(())
    }

    async fn remove_role(&self, role_id: RoleId) -> Result<(), UiError> {
        if self.fail_roles {
            return Err(UiError::NotInGuild);
        }
        self.push(Event::RemoveRole(role_id));
        Ok(())
    }

    async fn reply_ephemeral(&self, content: &str) -> Result<(), UiError> {
        self.push(Event::Reply(content.to_string()));
        Ok(())
    }

    async fn open_modal(&self, modal: &ModalConfig) -> Result<(), UiError> {
        self.push(Event::Modal(modal.custom_id.clone()));
        Ok(())
    }

    fn submitted_values(&self) -> Vec<(String, String)> {
        self.values.clone()
    }
}
