//! `/network` commands for the bot network connection and the role cache.

use poise::CreateReply;
use tracing::{info, warn};

use crate::checks::is_staff;
use crate::{CommandResult, Context};

#[poise::command(
    slash_command,
    guild_only,
    category = "Staff",
    subcommands("status", "refresh_roles"),
    subcommand_required
)]
pub async fn network(_ctx: Context<'_>) -> CommandResult {
    Ok(())
}

/// Check the bot network and database connections
#[poise::command(slash_command, guild_only, check = "is_staff", user_cooldown = 10)]
pub async fn status(ctx: Context<'_>) -> CommandResult {
    ctx.defer_ephemeral().await?;
    let data = ctx.data();

    let mut lines = Vec::new();
    match &data.network {
        Some(network) => {
            let state = if network.check_status().await.is_some() {
                "connected"
            } else {
                "unreachable"
            };
            lines.push(format!("Bot network: {}", state));
            let version = network.version().await.unwrap_or_else(|| "N/A".to_string());
            lines.push(format!("Version: {}", version));
        }
        None => lines.push("Bot network: disabled".to_string()),
    }

    #[cfg(feature = "mongo")]
    {
        let state = match &data.database {
            Some(database) => match database.lock().await.check_status().await {
                Ok(()) => "healthy".to_string(),
                Err(e) => format!("failing ({})", e),
            },
            None => "not configured".to_string(),
        };
        lines.push(format!("Database: {}", state));
    }

    lines.push(format!("Uptime: {}s", data.started_at.elapsed().as_secs()));

    ctx.send(
        CreateReply::default()
            .content(lines.join("\n"))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Fetch roles from the bot network and reload the role cache
#[poise::command(slash_command, guild_only, check = "is_staff", user_cooldown = 30)]
pub async fn refresh_roles(ctx: Context<'_>) -> CommandResult {
    ctx.defer_ephemeral().await?;
    let data = ctx.data();

    let content = match &data.network {
        Some(network) => match network
            .fetch_and_save_roles(&data.settings.roles_path())
            .await
        {
            Ok(_) => {
                let guilds = data.roles.refresh();
                info!("{} refreshed roles for {} guilds", ctx.author().name, guilds);
                format!("Roles refreshed for {} guilds.", guilds)
            }
            Err(e) => {
                warn!("Roles refresh failed: {}", e);
                "Roles fetch failed. Update roles.json in the bot network.".to_string()
            }
        },
        None => "The bot network connection is disabled.".to_string(),
    };

    ctx.send(CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}
