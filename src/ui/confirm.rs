//! Confirm/Cancel prompt answered by the invoking user only.

use poise::CreateReply;
use serenity::all::{
    ButtonStyle, ComponentInteractionCollector, CreateActionRow, CreateButton,
    CreateInteractionResponse, CreateInteractionResponseMessage,
};
use std::time::Duration;
use tracing::debug;

use crate::{Context, Error};

pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

const CONFIRM_SUFFIX: &str = "_confirm";
const CANCEL_SUFFIX: &str = "_cancel";

pub fn confirm_buttons(prefix: &str, disabled: bool) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(format!("{}{}", prefix, CONFIRM_SUFFIX))
            .label("Confirm")
            .style(ButtonStyle::Success)
            .disabled(disabled),
        CreateButton::new(format!("{}{}", prefix, CANCEL_SUFFIX))
            .label("Cancel")
            .style(ButtonStyle::Danger)
            .disabled(disabled),
    ])]
}

/// `Some(true)` for the confirm button of `prefix`, `Some(false)` for its cancel button.
pub fn parse_choice(custom_id: &str, prefix: &str) -> Option<bool> {
    match custom_id.strip_prefix(prefix)? {
        CONFIRM_SUFFIX => Some(true),
        CANCEL_SUFFIX => Some(false),
        _ => None,
    }
}

/// Asks the author to confirm `question`.
///
/// Returns `None` when nobody answered within [`CONFIRM_TIMEOUT`]. The buttons are disabled
/// once the prompt is settled either way.
pub async fn confirm(ctx: Context<'_>, question: &str) -> Result<Option<bool>, Error> {
    let prefix = ctx.id().to_string();

    let reply = ctx
        .send(
            CreateReply::default()
                .content(question)
                .components(confirm_buttons(&prefix, false))
                .ephemeral(true),
        )
        .await?;

    let filter_prefix = prefix.clone();
    let press = ComponentInteractionCollector::new(ctx)
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(CONFIRM_TIMEOUT)
        .filter(move |press| parse_choice(&press.data.custom_id, &filter_prefix).is_some())
        .await;

    let Some(press) = press else {
        debug!("Confirmation for '{}' timed out", question);
        reply
            .edit(
                ctx,
                CreateReply::default()
                    .content(format!("{}\nTimed out.", question))
                    .components(confirm_buttons(&prefix, true)),
            )
            .await?;
        return Ok(None);
    };

    let choice = parse_choice(&press.data.custom_id, &prefix);
    let outcome = if choice == Some(true) { "Confirmed" } else { "Cancelled" };
    press
        .create_response(
            ctx,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content(format!("{}\n{}.", question, outcome))
                    .components(confirm_buttons(&prefix, true)),
            ),
        )
        .await?;

    Ok(choice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("42_confirm", Some(true) ; "confirm")]
    #[test_case("42_cancel", Some(false) ; "cancel")]
    #[test_case("43_confirm", None ; "other prompt")]
    #[test_case("42_maybe", None ; "unknown suffix")]
    fn test_parse_choice(custom_id: &str, expected: Option<bool>) {
        assert_eq!(parse_choice(custom_id, "42"), expected);
    }

    #[test]
    fn test_buttons_share_one_row() {
        assert_eq!(confirm_buttons("42", false).len(), 1);
    }
}
