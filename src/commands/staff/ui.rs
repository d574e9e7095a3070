//! `/ui` commands for sending and refreshing configured UI elements.

use futures::{Stream, StreamExt};
use poise::{CreateReply, serenity_prelude as serenity};
use tracing::{debug, info};

use crate::checks::is_staff;
use crate::ui::UiError;
use crate::ui::confirm::confirm;
use crate::{CommandResult, Context};

#[poise::command(
    slash_command,
    guild_only,
    category = "Staff",
    subcommands("send", "reload", "list"),
    subcommand_required
)]
pub async fn ui(_ctx: Context<'_>) -> CommandResult {
    Ok(())
}

async fn ephemeral(ctx: Context<'_>, content: impl Into<String>) -> CommandResult {
    ctx.send(CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}

/// Send a configured UI element to a channel
#[poise::command(slash_command, guild_only, check = "is_staff", user_cooldown = 5)]
pub async fn send(
    ctx: Context<'_>,
    #[description = "Name of the UI element"]
    #[autocomplete = "autocomplete_element"]
    element: String,
    #[description = "Channel to send to (defaults to this one)"]
    channel: Option<serenity::GuildChannel>,
) -> CommandResult {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let channel_id = channel.map(|c| c.id).unwrap_or_else(|| ctx.channel_id());

    let sent = ctx
        .data()
        .ui
        .send_element(ctx.http(), channel_id, guild_id, &element, ctx.author().id)
        .await;

    match sent {
        Ok(message) => {
            info!(
                "{} sent UI element '{}' as message {}",
                ctx.author().name,
                element,
                message.id
            );
            ephemeral(ctx, format!("Sent '{}' to <#{}>.", element, channel_id)).await
        }
        Err(e @ (UiError::MissingElement { .. } | UiError::EmptyElement(_))) => {
            ephemeral(ctx, e.to_string()).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Refresh every persistent UI message from the current configuration
#[poise::command(slash_command, guild_only, check = "is_staff", user_cooldown = 30)]
pub async fn reload(
    ctx: Context<'_>,
    #[description = "Also forget messages that could not be refreshed"] prune: Option<bool>,
) -> CommandResult {
    ctx.defer_ephemeral().await?;

    let ui = &ctx.data().ui;
    let report = ui.reload(ctx.http()).await;
    let mut summary = format!(
        "Refreshed {} persistent messages, skipped {}.",
        report.refreshed.len(),
        report.skipped.len()
    );

    if prune.unwrap_or(false) && !report.skipped.is_empty() {
        let question = format!(
            "Forget {} persistent messages that could not be refreshed?",
            report.skipped.len()
        );
        if confirm(ctx, &question).await? == Some(true) {
            let removed = ui.persistence().forget(&report.skipped)?;
            summary.push_str(&format!(" Forgot {} records.", removed));
        }
    }

    ephemeral(ctx, summary).await
}

/// List the UI elements configured for this server
#[poise::command(slash_command, guild_only, check = "is_staff")]
pub async fn list(ctx: Context<'_>) -> CommandResult {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let config = ctx.data().ui.config();
    let lines: Vec<String> = config
        .guild(guild_id)
        .iter()
        .map(|(name, element)| {
            let persistent = if element.persistent { " (persistent)" } else { "" };
            format!("- `{}`{}", name, persistent)
        })
        .collect();

    if lines.is_empty() {
        return ephemeral(ctx, "No UI elements are configured for this server.").await;
    }
    ephemeral(ctx, lines.join("\n")).await
}

/// Suggests element names configured for the invoking guild.
async fn autocomplete_element<'a>(
    ctx: Context<'_>,
    partial: &'a str,
) -> impl Stream<Item = String> + 'a {
    debug!("Processing element autocomplete for partial: '{}'", partial);
    let names: Vec<String> = match ctx.guild_id() {
        Some(guild_id) => ctx
            .data()
            .ui
            .config()
            .element_names(guild_id)
            .into_iter()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    futures::stream::iter(names)
        .filter(move |name| futures::future::ready(name.starts_with(partial)))
}
