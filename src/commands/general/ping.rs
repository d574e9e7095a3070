use poise::{CreateReply, serenity_prelude as serenity};
use std::time::Duration;

use crate::ui::embeds::ping_panel;
use crate::{CommandResult, Context};

/// Ping the bot to check its latency
#[poise::command(slash_command, category = "General", user_cooldown = 5)]
pub async fn ping(ctx: Context<'_>) -> CommandResult {
    let latency = get_shard_latency(&ctx).await;
    let panel = ping_panel(latency, &ctx.author().name);

    ctx.send(CreateReply::default().embed(panel.into())).await?;

    Ok(())
}

async fn get_shard_latency(ctx: &Context<'_>) -> Option<Duration> {
    // Each shard is driven by a runner that tracks its heartbeat latency.
    let shard_manager = ctx.framework().shard_manager();
    let runners = shard_manager.runners.lock().await;

    let runner = runners.get(&serenity::ShardId(ctx.serenity_context().shard_id.0))?;

    runner.latency
}
