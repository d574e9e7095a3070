use poise::CreateReply;
use tracing::warn;

use crate::ui::embeds::{ServerSnapshot, roles_export, server_info_panel};
use crate::{CommandResult, Context};

/// Show information about this server, with its roles attached as JSON
#[poise::command(slash_command, guild_only, category = "General", user_cooldown = 10)]
pub async fn server_info(ctx: Context<'_>) -> CommandResult {
    // The cache guard must be dropped before awaiting.
    let snapshot = ctx.guild().map(|guild| ServerSnapshot::from_guild(&guild));
    let Some(snapshot) = snapshot else {
        ctx.say("Server information is not available yet, try again shortly.")
            .await?;
        return Ok(());
    };

    let bnc_roles = ctx.data().roles.guild_roles(snapshot.id);
    let panel = server_info_panel(&snapshot, bnc_roles.as_ref(), &ctx.author().name);

    let mut reply = CreateReply::default().embed(panel.into());
    match roles_export(&snapshot, bnc_roles.as_ref()) {
        Ok(attachment) => reply = reply.attachment(attachment),
        Err(e) => warn!("Unable to export roles of {}: {}", snapshot.id, e),
    }
    ctx.send(reply).await?;

    Ok(())
}
