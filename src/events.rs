use poise::serenity_prelude as serenity;
use serenity::{FullEvent, Interaction};
use tracing::{debug, info};

use crate::{Data, Error};

/// Gateway events not covered by commands.
///
/// Component and modal interactions go to the UI manager; the registry ignores ids it does
/// not know, so prompts answered through collectors pass through harmlessly.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!(
                "Logged in as {} in {} guilds",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }
        FullEvent::InteractionCreate { interaction } => match interaction {
            Interaction::Component(component) => {
                debug!("Component interaction '{}'", component.data.custom_id);
                data.ui.handle_component(ctx, component).await;
            }
            Interaction::Modal(modal) => {
                debug!("Modal submission '{}'", modal.data.custom_id);
                data.ui.handle_modal(ctx, modal).await;
            }
            _ => (),
        },
        _ => (),
    }
    Ok(())
}
