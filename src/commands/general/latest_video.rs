use poise::CreateReply;
use serenity::all::{CreateEmbed, CreateEmbedFooter};
use tracing::error;

use crate::ui::embeds::DEFAULT_COLOUR;
use crate::{CommandResult, Context};

/// Show the newest upload of a YouTube channel
#[poise::command(slash_command, category = "General", user_cooldown = 30)]
pub async fn latest_video(
    ctx: Context<'_>,
    #[description = "YouTube channel id (starts with UC)"] channel_id: String,
) -> CommandResult {
    let Some(youtube) = &ctx.data().youtube else {
        ctx.send(
            CreateReply::default()
                .content("YouTube lookups are not configured.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    ctx.defer().await?;

    let reply = match youtube.latest_video(&channel_id).await {
        Ok(Some(video)) => {
            let mut embed = CreateEmbed::new()
                .title(&video.title)
                .url(video.url())
                .description(&video.description)
                .colour(DEFAULT_COLOUR)
                .footer(CreateEmbedFooter::new(format!("Requested by {}", ctx.author().name)));
            if let Some(thumbnail) = video.best_thumbnail() {
                embed = embed.image(thumbnail);
            }
            CreateReply::default().embed(embed)
        }
        Ok(None) => CreateReply::default().content("That channel has no videos."),
        Err(e) => {
            error!("YouTube lookup for {} failed: {}", channel_id, e);
            CreateReply::default().content("Unable to reach YouTube right now.")
        }
    };
    ctx.send(reply).await?;

    Ok(())
}
