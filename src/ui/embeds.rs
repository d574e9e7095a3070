//! Read-only info panels (ping, server info, user info).
//!
//! Panels are composed from plain snapshots of cache state, so the formatting does not need a
//! live gateway connection.

use chrono::{DateTime, Utc};
use serde_json::json;
use serenity::all::{
    ChannelType, Colour, CreateAttachment, CreateEmbed, CreateEmbedFooter, Guild, GuildId,
    Member, Mentionable, OnlineStatus, Role, RoleId, Timestamp, UserId,
};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::checks::{GuildRoles, STAFF_ROLE, VERIFIED_ROLE};
use crate::utils::time::format_datetime;

pub const DEFAULT_COLOUR: Colour = Colour::DARKER_GREY;

const FIELD_VALUE_LIMIT: usize = 1024;
const YES: &str = "🟢";
const NO: &str = "🔴";

/// An embed under construction. Converts into a serenity [`CreateEmbed`].
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<(String, String, bool)>,
    pub footer: Option<String>,
    pub thumbnail: Option<String>,
    pub timestamp: Option<Timestamp>,
    pub colour: Colour,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields: Vec::new(),
            footer: None,
            thumbnail: None,
            timestamp: Some(Timestamp::now()),
            colour: DEFAULT_COLOUR,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields
            .push((name.into(), truncate(value.into(), FIELD_VALUE_LIMIT), inline));
        self
    }

    pub fn requested_by(mut self, user: &str) -> Self {
        self.footer = Some(format!("Requested by {}", user));
        self
    }

    pub fn thumbnail(mut self, url: Option<String>) -> Self {
        self.thumbnail = url;
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _, _)| field == name)
            .map(|(_, value, _)| value.as_str())
    }
}

impl From<Panel> for CreateEmbed {
    fn from(panel: Panel) -> Self {
        let mut embed = CreateEmbed::new()
            .title(panel.title)
            .colour(panel.colour)
            .fields(panel.fields);
        if let Some(description) = panel.description {
            embed = embed.description(description);
        }
        if let Some(footer) = panel.footer {
            embed = embed.footer(CreateEmbedFooter::new(footer));
        }
        if let Some(thumbnail) = panel.thumbnail {
            embed = embed.thumbnail(thumbnail);
        }
        if let Some(timestamp) = panel.timestamp {
            embed = embed.timestamp(timestamp);
        }
        embed
    }
}

fn truncate(mut value: String, limit: usize) -> String {
    if value.chars().count() > limit {
        value = value.chars().take(limit - 1).collect();
        value.push('…');
    }
    value
}

fn yes_no(flag: bool) -> &'static str {
    if flag { YES } else { NO }
}

pub fn discord_time(timestamp: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0).unwrap_or_default()
}

pub fn ping_panel(latency: Option<Duration>, requested_by: &str) -> Panel {
    let description = match latency {
        Some(latency) => format!("Latency: {}ms", latency.as_millis()),
        None => "Latency: unavailable".to_string(),
    };
    Panel::new("🏓").description(description).requested_by(requested_by)
}

/// Ordering data for picking a member's display role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRank {
    pub id: RoleId,
    pub colour: Colour,
    pub position: u16,
}

impl From<&Role> for RoleRank {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            colour: role.colour,
            position: role.position,
        }
    }
}

/// `(all channels, categories)` among `kinds`.
pub fn count_channels(kinds: impl IntoIterator<Item = ChannelType>) -> (usize, usize) {
    kinds.into_iter().fold((0, 0), |(all, categories), kind| {
        let category = usize::from(kind == ChannelType::Category);
        (all + 1, categories + category)
    })
}

/// The highest-positioned role that carries a colour.
pub fn highest_coloured_role(roles: impl IntoIterator<Item = RoleRank>) -> Option<RoleId> {
    roles
        .into_iter()
        .filter(|role| role.colour.0 != 0)
        .max_by_key(|role| role.position)
        .map(|role| role.id)
}

/// Guild state shown by the server info panel.
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    pub id: GuildId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    /// Every guild channel, categories included.
    pub channel_count: usize,
    pub category_count: usize,
    pub member_count: u64,
    pub online_count: usize,
    pub icon_url: Option<String>,
    pub roles: BTreeMap<String, RoleId>,
}

impl ServerSnapshot {
    pub fn from_guild(guild: &Guild) -> Self {
        let (channels, categories) =
            count_channels(guild.channels.values().map(|channel| channel.kind));
        Self {
            id: guild.id,
            name: guild.name.clone(),
            owner_id: guild.owner_id,
            created_at: discord_time(guild.id.created_at()),
            channel_count: channels,
            category_count: categories,
            member_count: guild.member_count,
            online_count: guild
                .presences
                .values()
                .filter(|presence| presence.status != OnlineStatus::Offline)
                .count(),
            icon_url: guild.icon_url(),
            roles: guild
                .roles
                .values()
                .map(|role| (role.name.clone(), role.id))
                .collect(),
        }
    }
}

pub fn server_info_panel(
    server: &ServerSnapshot,
    bnc_roles: Option<&GuildRoles>,
    requested_by: &str,
) -> Panel {
    let bnc_value = match bnc_roles {
        Some(roles) => serde_json::to_string(roles).unwrap_or_default(),
        None => "No Roles.json Data".to_string(),
    };

    Panel::new(format!("Server Information for {} ({})", server.name, server.id))
        .thumbnail(server.icon_url.clone())
        .requested_by(requested_by)
        .field("Owner", server.owner_id.mention().to_string(), true)
        .field("Server Created", format_datetime(&server.created_at), true)
        .field("Channels", format!("{} Channels", server.channel_count), true)
        .field("Categories", format!("{} Categories", server.category_count), true)
        .field("Member Count", format!("{} Members", server.member_count), true)
        .field("Online Members", format!("{} Members", server.online_count), true)
        .field("Roles", format!("{} Roles", server.roles.len()), false)
        .field("BNC Roles.json", bnc_value, false)
}

/// The guild's live roles next to the cached roles, as one JSON file.
pub fn roles_export(
    server: &ServerSnapshot,
    bnc_roles: Option<&GuildRoles>,
) -> Result<CreateAttachment, serde_json::Error> {
    let export = json!({
        "server_roles": server.roles,
        "bnc_roles": bnc_roles.cloned().unwrap_or_default(),
    });
    let body = serde_json::to_vec_pretty(&export)?;
    Ok(CreateAttachment::bytes(
        body,
        format!("{}_roles.json", server.name.replace(' ', "_")),
    ))
}

/// Member state shown by the user info panel.
#[derive(Debug, Clone)]
pub struct MemberSnapshot {
    pub id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub joined_at: Option<DateTime<Utc>>,
    pub online: bool,
    pub avatar_url: String,
    pub role_ids: Vec<RoleId>,
    pub highest_role: Option<RoleId>,
}

impl MemberSnapshot {
    pub fn from_member(member: &Member, guild: Option<&Guild>) -> Self {
        let online = guild
            .and_then(|guild| guild.presences.get(&member.user.id))
            .is_some_and(|presence| presence.status != OnlineStatus::Offline);
        let highest_role = guild.and_then(|guild| {
            highest_coloured_role(
                member
                    .roles
                    .iter()
                    .filter_map(|id| guild.roles.get(id))
                    .map(RoleRank::from),
            )
        });

        Self {
            id: member.user.id,
            name: member.user.name.clone(),
            created_at: discord_time(member.user.id.created_at()),
            joined_at: member.joined_at.map(discord_time),
            online,
            avatar_url: member.face(),
            role_ids: member.roles.clone(),
            highest_role,
        }
    }

    fn holds(&self, roles: Option<&GuildRoles>, name: &str) -> bool {
        roles
            .and_then(|roles| roles.get(name))
            .is_some_and(|role| self.role_ids.contains(role))
    }
}

pub fn user_info_panel(
    member: &MemberSnapshot,
    bnc_roles: Option<&GuildRoles>,
    requested_by: &str,
) -> Panel {
    let joined = member
        .joined_at
        .as_ref()
        .map(format_datetime)
        .unwrap_or_else(|| "Unknown".to_string());
    let highest = member
        .highest_role
        .map(|role| role.mention().to_string())
        .unwrap_or_else(|| "None".to_string());

    Panel::new(format!("Member Information for {} ({})", member.name, member.id))
        .thumbnail(Some(member.avatar_url.clone()))
        .requested_by(requested_by)
        .field("Account Created", format_datetime(&member.created_at), true)
        .field("Member Joined", joined, true)
        .field("Online Status", yes_no(member.online), true)
        .field("Verified", yes_no(member.holds(bnc_roles, VERIFIED_ROLE)), false)
        .field("Staff Member", yes_no(member.holds(bnc_roles, STAFF_ROLE)), false)
        .field("Highest Role", highest, false)
}
