//! Sample data used across the integration tests

use serde_json::{Value, json};

pub const GUILD_ID: u64 = 111;
pub const OTHER_GUILD_ID: u64 = 222;
pub const STAFF_ROLE_ID: u64 = 333;
pub const MEMBER_ROLE_ID: u64 = 444;
pub const USER_ID: u64 = 123456789;
pub const CHANNEL_ID: u64 = 987654321;
pub const DELETED_CHANNEL_ID: u64 = 987654000;

pub const UI_ELEMENTS: &str = r#"{
    "111": {
        "welcome": {
            "persistent": true,
            "embeds": [
                { "title": "Welcome!", "description": "Pick your roles below", "color": 5793266,
                  "fields": [{ "name": "Rules", "value": "Be nice" }] }
            ],
            "components": [
                { "type": "button", "custom_id": "join_members", "label": "Join", "style": 3 },
                { "type": "button", "custom_id": "leave_members", "label": "Leave", "style": 4 },
                { "type": "button", "custom_id": "open_feedback", "label": "Feedback", "style": 2 },
                { "type": "button", "label": "Docs", "style": 5, "url": "https://example.com" },
                { "type": "select", "custom_id": "topics", "placeholder": "Topics", "max_values": 2,
                  "options": [
                    { "label": "Rust", "value": "topic_rust" },
                    { "label": "Go", "value": "topic_go" }
                  ] }
            ],
            "modals": [
                { "custom_id": "feedback", "title": "Feedback", "response": "Thanks for the feedback!",
                  "fields": [{ "custom_id": "body", "label": "Your feedback", "style": "paragraph" }] }
            ],
            "actions": [
                { "type": "add_role", "custom_id": "join_members", "role_id": "444" },
                { "type": "remove_role", "custom_id": "leave_members", "role_id": 444, "response": "See you!" },
                { "type": "modal", "custom_id": "open_feedback", "modal_id": "feedback" },
                { "type": "message", "custom_id": "topic_rust", "message": "Rust it is" },
                { "type": "message", "custom_id": "topic_go" }
            ]
        },
        "announcement": {
            "embeds": [{ "title": "Maintenance tonight" }]
        }
    },
    "222": {
        "welcome": {
            "actions": [{ "type": "message", "custom_id": "join_members", "message": "Other guild" }]
        }
    }
}"#;

pub const ROLES: &str = r#"{
    "111": { "Staff_Member": "333", "Verified": "555" }
}"#;

/// The bot data document served by the bot network
pub fn bot_document() -> Value {
    json!({
        "applicationId": "42",
        "data": {
            "version": "3.1.0",
            "startup_info": "ready",
            "roles": { "111": { "Staff_Member": "333", "Verified": "555" } }
        }
    })
}
