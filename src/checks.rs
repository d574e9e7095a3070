//! Role-based command checks and cooldown messages.
//!
//! Roles are resolved by name through the cached `roles.json` (guild id -> role name -> role id).
//! Every lookup that cannot be completed denies access.

use poise::CreateReply;
use serenity::all::{GuildId, RoleId};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info};

use crate::utils::json_store;
use crate::{Context, Error};

pub const STAFF_ROLE: &str = "Staff_Member";
pub const VERIFIED_ROLE: &str = "Verified";

pub const DM_DENIED: &str = "This command cannot be used in DMs.";
pub const ROLE_DENIED: &str = "You do not have the required role to use this command.";

pub type GuildRoles = BTreeMap<String, RoleId>;
pub type RoleMap = HashMap<String, GuildRoles>;

/// In-memory copy of `roles.json`.
pub struct RoleCache {
    path: PathBuf,
    roles: RwLock<RoleMap>,
}

impl RoleCache {
    pub fn load(path: &Path) -> Self {
        let cache = Self {
            path: path.to_path_buf(),
            roles: RwLock::new(RoleMap::new()),
        };
        cache.refresh();
        cache
    }

    pub fn from_map(roles: RoleMap) -> Self {
        Self {
            path: PathBuf::new(),
            roles: RwLock::new(roles),
        }
    }

    /// Re-reads the roles file. Returns the number of guilds loaded.
    pub fn refresh(&self) -> usize {
        let roles: RoleMap = json_store::load_json(&self.path);
        let guilds = roles.len();
        *self.roles.write().unwrap_or_else(PoisonError::into_inner) = roles;
        info!("Role cache holds {} guilds", guilds);
        guilds
    }

    pub fn role_id(&self, guild_id: GuildId, role_name: &str) -> Option<RoleId> {
        self.roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&guild_id.to_string())
            .and_then(|roles| roles.get(role_name))
            .copied()
    }

    pub fn guild_roles(&self, guild_id: GuildId) -> Option<GuildRoles> {
        self.roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&guild_id.to_string())
            .cloned()
    }

    /// Whether a member holding `member_roles` has the named role in `guild_id`.
    pub fn member_has_role(&self, guild_id: GuildId, member_roles: &[RoleId], role_name: &str) -> bool {
        self.role_id(guild_id, role_name)
            .is_some_and(|role| member_roles.contains(&role))
    }
}

/// Result of a role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCheck {
    Allowed,
    NotInGuild,
    MissingRole,
}

impl RoleCheck {
    /// The message shown to a denied user.
    pub fn denial(&self) -> Option<&'static str> {
        match self {
            RoleCheck::Allowed => None,
            RoleCheck::NotInGuild => Some(DM_DENIED),
            RoleCheck::MissingRole => Some(ROLE_DENIED),
        }
    }
}

pub fn check_role(
    roles: &RoleCache,
    guild_id: Option<GuildId>,
    member_roles: &[RoleId],
    role_name: &str,
) -> RoleCheck {
    match guild_id {
        None => RoleCheck::NotInGuild,
        Some(guild_id) if roles.member_has_role(guild_id, member_roles, role_name) => {
            RoleCheck::Allowed
        }
        Some(_) => RoleCheck::MissingRole,
    }
}

/// Checks the invoking member for `role_name` and answers privately when denied.
pub async fn require_role(ctx: Context<'_>, role_name: &str) -> Result<bool, Error> {
    let member_roles = match ctx.author_member().await {
        Some(member) => member.roles.clone(),
        None => Vec::new(),
    };

    let outcome = check_role(&ctx.data().roles, ctx.guild_id(), &member_roles, role_name);
    if let Some(message) = outcome.denial() {
        debug!(
            "User {} denied '{}' (requires {}): {:?}",
            ctx.author().name,
            ctx.command().qualified_name,
            role_name,
            outcome
        );
        ctx.send(CreateReply::default().content(message).ephemeral(true))
            .await?;
        return Ok(false);
    }
    Ok(true)
}

/// Poise check: the author holds the guild's `Staff_Member` role.
pub async fn is_staff(ctx: Context<'_>) -> Result<bool, Error> {
    require_role(ctx, STAFF_ROLE).await
}

/// Poise check: the author holds the guild's `Verified` role.
pub async fn is_verified(ctx: Context<'_>) -> Result<bool, Error> {
    require_role(ctx, VERIFIED_ROLE).await
}

pub fn format_cooldown(remaining: Duration) -> String {
    format!(
        "This command is on cooldown. Try again in {:.1} seconds.",
        remaining.as_secs_f32()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use test_case::test_case;

    fn cache() -> RoleCache {
        let mut guild = GuildRoles::new();
        guild.insert(STAFF_ROLE.to_string(), RoleId::new(500));
        let mut roles = RoleMap::new();
        roles.insert("10".to_string(), guild);
        RoleCache::from_map(roles)
    }

    #[test_case(Some(10), &[500], STAFF_ROLE, RoleCheck::Allowed ; "member with role")]
    #[test_case(Some(10), &[501], STAFF_ROLE, RoleCheck::MissingRole ; "member without role")]
    #[test_case(Some(10), &[500], VERIFIED_ROLE, RoleCheck::MissingRole ; "role not in cache")]
    #[test_case(Some(11), &[500], STAFF_ROLE, RoleCheck::MissingRole ; "guild not in cache")]
    #[test_case(None, &[500], STAFF_ROLE, RoleCheck::NotInGuild ; "direct message")]
    fn test_check_role(guild: Option<u64>, member: &[u64], role: &str, expected: RoleCheck) {
        let member: Vec<RoleId> = member.iter().copied().map(RoleId::new).collect();

        let outcome = check_role(&cache(), guild.map(GuildId::new), &member, role);

        assert_eq!(outcome, expected);
    }

    #[test]
    fn test_denial_messages() {
        assert_eq!(RoleCheck::Allowed.denial(), None);
        assert_eq!(RoleCheck::NotInGuild.denial(), Some(DM_DENIED));
        assert_eq!(RoleCheck::MissingRole.denial(), Some(ROLE_DENIED));
    }

    #[test]
    fn test_cache_reads_string_and_numeric_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(
            &path,
            r#"{ "10": { "Staff_Member": "500", "Verified": 501 } }"#,
        )
        .unwrap();

        let cache = RoleCache::load(&path);

        assert_eq!(cache.role_id(GuildId::new(10), STAFF_ROLE), Some(RoleId::new(500)));
        assert_eq!(cache.role_id(GuildId::new(10), VERIFIED_ROLE), Some(RoleId::new(501)));
    }

    #[test]
    fn test_missing_roles_file_denies() {
        let dir = TempDir::new().unwrap();
        let cache = RoleCache::load(&dir.path().join("roles.json"));

        assert_eq!(
            check_role(&cache, Some(GuildId::new(10)), &[RoleId::new(500)], STAFF_ROLE),
            RoleCheck::MissingRole
        );
    }

    #[test]
    fn test_refresh_picks_up_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        let cache = RoleCache::load(&path);
        assert_eq!(cache.guild_roles(GuildId::new(10)), None);

        std::fs::write(&path, r#"{ "10": { "Verified": "501" } }"#).unwrap();

        assert_eq!(cache.refresh(), 1);
        assert_eq!(cache.guild_roles(GuildId::new(10)).map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_format_cooldown() {
        assert_eq!(
            format_cooldown(Duration::from_millis(2500)),
            "This command is on cooldown. Try again in 2.5 seconds."
        );
    }
}
