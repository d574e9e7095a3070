//! Declarative UI definitions loaded from `ui_elements.json`.
//!
//! The document maps a guild id to named elements:
//!
//! ```json
//! {
//!   "123456789012345678": {
//!     "roles_panel": {
//!       "persistent": true,
//!       "embeds": [{ "title": "Pick a role", "color": 5793266 }],
//!       "components": [{ "type": "button", "custom_id": "get_member", "label": "Member", "style": 3 }],
//!       "actions": [{ "type": "add_role", "custom_id": "get_member", "role_id": "234567890123456789" }]
//!     }
//!   }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serenity::all::{GuildId, RoleId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

use crate::utils::json_store;

/// Elements of one guild, keyed by element name.
pub type GuildElements = BTreeMap<String, UiElement>;

/// Deserializes a list item by item, dropping items that do not parse.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping malformed UI definition: {}", e);
                None
            }
        })
        .collect())
}

/// One named, renderable UI element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    /// Sent messages are recorded so they can be refreshed after a restart.
    #[serde(default)]
    pub persistent: bool,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub embeds: Vec<EmbedConfig>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub components: Vec<ComponentConfig>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub modals: Vec<ModalConfig>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub actions: Vec<ActionConfig>,
}

impl UiElement {
    pub fn modal(&self, custom_id: &str) -> Option<&ModalConfig> {
        self.modals.iter().find(|modal| modal.custom_id == custom_id)
    }

    pub fn action(&self, custom_id: &str) -> Option<&ActionConfig> {
        self.actions
            .iter()
            .find(|action| action.custom_id() == Some(custom_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub color: u32,
    pub url: Option<String>,
    pub footer: Option<String>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// An interactive component. Unknown `type` values are kept as [`ComponentConfig::Unknown`]
/// and skipped when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentConfig {
    Button(ButtonConfig),
    Select(SelectConfig),
    #[serde(other)]
    Unknown,
}

impl ComponentConfig {
    pub fn custom_id(&self) -> Option<&str> {
        match self {
            ComponentConfig::Button(button) => button.custom_id.as_deref(),
            ComponentConfig::Select(select) => Some(&select.custom_id),
            ComponentConfig::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub custom_id: Option<String>,
    pub label: Option<String>,
    /// 1 primary, 2 secondary, 3 success, 4 danger, 5 link.
    #[serde(default = "default_button_style")]
    pub style: u8,
    pub emoji: Option<String>,
    /// Link buttons carry a url instead of a custom id.
    pub url: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

fn default_button_style() -> u8 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectConfig {
    pub custom_id: String,
    pub placeholder: Option<String>,
    pub min_values: Option<u8>,
    pub max_values: Option<u8>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub options: Vec<SelectOptionConfig>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectOptionConfig {
    pub label: String,
    /// Dispatched as an action id when selected.
    pub value: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalConfig {
    pub custom_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub fields: Vec<ModalFieldConfig>,
    /// Ephemeral reply sent when the modal is submitted.
    pub response: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalFieldConfig {
    pub custom_id: String,
    pub label: String,
    #[serde(default)]
    pub style: InputStyle,
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStyle {
    #[default]
    Short,
    Paragraph,
}

/// What happens when a component with a matching `custom_id` is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    Message {
        custom_id: String,
        message: Option<String>,
    },
    AddRole {
        custom_id: String,
        role_id: RoleId,
        response: Option<String>,
    },
    RemoveRole {
        custom_id: String,
        role_id: RoleId,
        response: Option<String>,
    },
    Modal {
        custom_id: String,
        /// Modal to open; defaults to `custom_id`.
        modal_id: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ActionConfig {
    pub fn custom_id(&self) -> Option<&str> {
        match self {
            ActionConfig::Message { custom_id, .. }
            | ActionConfig::AddRole { custom_id, .. }
            | ActionConfig::RemoveRole { custom_id, .. }
            | ActionConfig::Modal { custom_id, .. } => Some(custom_id),
            ActionConfig::Unknown => None,
        }
    }
}

/// Immutable store of every guild's UI elements.
#[derive(Debug, Clone, Default)]
pub struct UiConfigStore {
    guilds: HashMap<String, GuildElements>,
    empty: GuildElements,
}

impl UiConfigStore {
    /// Loads the store from `path`. A missing or malformed file yields an empty store.
    pub fn load(path: &Path) -> Self {
        let raw: HashMap<String, Value> = json_store::load_json(path);
        let guilds = parse_guilds(raw);
        let elements: usize = guilds.values().map(BTreeMap::len).sum();
        if guilds.is_empty() {
            warn!("No UI elements loaded from {}", path.display());
        } else {
            info!(
                "Loaded {} UI elements for {} guilds from {}",
                elements,
                guilds.len(),
                path.display()
            );
        }
        Self::from_guilds(guilds)
    }

    pub fn from_guilds(guilds: HashMap<String, GuildElements>) -> Self {
        Self {
            guilds,
            empty: GuildElements::new(),
        }
    }

    /// Parses a document. Malformed guilds, elements and definitions are skipped.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
            .map(parse_guilds)
            .map(Self::from_guilds)
    }

    /// All elements of a guild; empty when the guild has none.
    pub fn guild(&self, guild_id: GuildId) -> &GuildElements {
        self.guilds.get(&guild_id.to_string()).unwrap_or(&self.empty)
    }

    pub fn element(&self, guild_id: GuildId, name: &str) -> Option<&UiElement> {
        self.guild(guild_id).get(name)
    }

    /// The element, or an empty one that renders nothing.
    pub fn element_or_default(&self, guild_id: GuildId, name: &str) -> UiElement {
        self.element(guild_id, name).cloned().unwrap_or_default()
    }

    pub fn element_names(&self, guild_id: GuildId) -> Vec<&str> {
        self.guild(guild_id).keys().map(String::as_str).collect()
    }

    /// Every `(guild, elements)` pair whose key is a valid guild id.
    pub fn guilds(&self) -> impl Iterator<Item = (GuildId, &GuildElements)> {
        self.guilds.iter().filter_map(|(key, elements)| {
            match key.parse::<u64>() {
                Ok(id) if id != 0 => Some((GuildId::new(id), elements)),
                _ => {
                    warn!("Ignoring UI elements under invalid guild id '{}'", key);
                    None
                }
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }
}

/// Parses each guild and element on its own so one bad entry only drops itself.
fn parse_guilds(raw: HashMap<String, Value>) -> HashMap<String, GuildElements> {
    raw.into_iter()
        .filter_map(|(guild, elements)| {
            let elements: BTreeMap<String, Value> = match serde_json::from_value(elements) {
                Ok(elements) => elements,
                Err(e) => {
                    warn!("Skipping UI elements of guild '{}': {}", guild, e);
                    return None;
                }
            };
            let parsed = elements
                .into_iter()
                .filter_map(|(name, element)| match serde_json::from_value(element) {
                    Ok(element) => Some((name, element)),
                    Err(e) => {
                        warn!("Skipping UI element '{}' of guild '{}': {}", name, guild, e);
                        None
                    }
                })
                .collect();
            Some((guild, parsed))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    const GUILD: u64 = 111_222_333;

    const DOCUMENT: &str = r#"{
        "111222333": {
            "roles_panel": {
                "persistent": true,
                "embeds": [{
                    "title": "Roles",
                    "description": "Pick one",
                    "fields": [{ "name": "Member", "value": "Access", "inline": true }]
                }],
                "components": [
                    { "type": "button", "custom_id": "get_member", "label": "Member", "style": 3 },
                    { "type": "select", "custom_id": "colour", "options": [
                        { "label": "Red", "value": "colour_red" }
                    ] },
                    { "type": "text_display", "content": "ignored" }
                ],
                "modals": [{
                    "custom_id": "feedback",
                    "title": "Feedback",
                    "fields": [{ "custom_id": "body", "label": "Body", "style": "paragraph" }]
                }],
                "actions": [
                    { "type": "add_role", "custom_id": "get_member", "role_id": "444555666" },
                    { "type": "message", "custom_id": "colour_red", "message": "Red it is" },
                    { "type": "modal", "custom_id": "open_feedback", "modal_id": "feedback" },
                    { "type": "ban_user", "custom_id": "nope" }
                ]
            }
        }
    }"#;

    #[test]
    fn test_parse_document() {
        let store = UiConfigStore::from_json_str(DOCUMENT).unwrap();
        let element = store.element(GuildId::new(GUILD), "roles_panel").unwrap();

        assert!(element.persistent);
        assert_eq!(element.embeds[0].title.as_deref(), Some("Roles"));
        assert_eq!(element.embeds[0].color, 0);
        assert!(element.embeds[0].fields[0].inline);

        assert_matches!(&element.components[0], ComponentConfig::Button(b) if b.style == 3);
        assert_matches!(&element.components[1], ComponentConfig::Select(s) if s.options.len() == 1);
        assert_eq!(element.components[2], ComponentConfig::Unknown);

        assert_eq!(element.modals[0].fields[0].style, InputStyle::Paragraph);
        assert_eq!(
            element.actions[0],
            ActionConfig::AddRole {
                custom_id: "get_member".to_string(),
                role_id: RoleId::new(444_555_666),
                response: None,
            }
        );
        assert_eq!(element.actions[3], ActionConfig::Unknown);
        assert_eq!(element.action("colour_red").and_then(ActionConfig::custom_id), Some("colour_red"));
        assert!(element.modal("feedback").is_some());
    }

    #[test]
    fn test_missing_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = UiConfigStore::load(&dir.path().join("ui_elements.json"));

        assert!(store.is_empty());
        assert!(store.guild(GuildId::new(GUILD)).is_empty());
        assert!(store.element(GuildId::new(GUILD), "roles_panel").is_none());
        assert_eq!(
            store.element_or_default(GuildId::new(GUILD), "roles_panel"),
            UiElement::default()
        );
    }

    #[test]
    fn test_unknown_guild_and_element() {
        let store = UiConfigStore::from_json_str(DOCUMENT).unwrap();

        assert!(store.guild(GuildId::new(999)).is_empty());
        assert!(store.element(GuildId::new(GUILD), "absent").is_none());
        assert_eq!(store.element_names(GuildId::new(GUILD)), vec!["roles_panel"]);
    }

    #[test]
    fn test_malformed_definitions_only_drop_themselves() {
        let store = UiConfigStore::from_json_str(
            r#"{
                "111": { "welcome": { "embeds": [{ "title": "Welcome" }] } },
                "222": {
                    "roles": {
                        "components": [
                            { "type": "select", "options": [] },
                            { "type": "button", "custom_id": "get_member", "label": "Member" }
                        ],
                        "actions": [
                            { "type": "add_role", "custom_id": "broken" },
                            { "type": "message", "custom_id": "get_member", "message": "Hi" }
                        ]
                    },
                    "flags": { "persistent": "sometimes" }
                },
                "333": ["not", "elements"]
            }"#,
        )
        .unwrap();

        let welcome = store.element(GuildId::new(111), "welcome").unwrap();
        assert_eq!(welcome.embeds[0].title.as_deref(), Some("Welcome"));

        let roles = store.element(GuildId::new(222), "roles").unwrap();
        assert_eq!(roles.components.len(), 1);
        assert_eq!(roles.actions.len(), 1);
        assert!(roles.action("get_member").is_some());
        assert!(roles.action("broken").is_none());

        assert!(store.element(GuildId::new(222), "flags").is_none());
        assert!(store.guild(GuildId::new(333)).is_empty());
    }

    #[test]
    fn test_malformed_entry_in_file_keeps_other_guilds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui_elements.json");
        std::fs::write(
            &path,
            r#"{
                "111": { "welcome": { "actions": [{ "type": "message", "custom_id": "hi" }] } },
                "222": { "panel": { "actions": [{ "type": "remove_role", "custom_id": "b" }] } }
            }"#,
        )
        .unwrap();

        let store = UiConfigStore::load(&path);

        assert!(store.element(GuildId::new(111), "welcome").is_some());
        assert!(store.element(GuildId::new(222), "panel").unwrap().actions.is_empty());
    }

    #[test]
    fn test_invalid_guild_keys_are_skipped() {
        let store = UiConfigStore::from_json_str(r#"{ "abc": {}, "0": {}, "42": {} }"#).unwrap();

        let guilds: Vec<GuildId> = store.guilds().map(|(id, _)| id).collect();
        assert_eq!(guilds, vec![GuildId::new(42)]);
    }
}
