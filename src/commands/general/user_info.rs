use poise::{CreateReply, serenity_prelude as serenity};

use crate::ui::embeds::{MemberSnapshot, user_info_panel};
use crate::{CommandResult, Context};

/// Show information about a member of this server
#[poise::command(slash_command, guild_only, category = "General", user_cooldown = 5)]
pub async fn user_info(
    ctx: Context<'_>,
    #[description = "Member to look up (defaults to you)"] member: Option<serenity::Member>,
) -> CommandResult {
    let member = match member {
        Some(member) => member,
        None => match ctx.author_member().await {
            Some(member) => member.into_owned(),
            None => {
                ctx.say("Unable to find you in this server.").await?;
                return Ok(());
            }
        },
    };

    let snapshot = {
        let guild = ctx.guild();
        MemberSnapshot::from_member(&member, guild.as_deref())
    };
    let bnc_roles = ctx.data().roles.guild_roles(member.guild_id);
    let panel = user_info_panel(&snapshot, bnc_roles.as_ref(), &ctx.author().name);

    ctx.send(CreateReply::default().embed(panel.into())).await?;

    Ok(())
}
