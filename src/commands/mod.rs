//! This module aggregates all the command modules for the bot.

/// General purpose commands (e.g., ping, server and user info).
pub mod general;
/// Staff-only commands for managing UI elements and the bot network connection.
pub mod staff;

use crate::{CommandResult, Context, Data, Error};

/// Show help for all commands or a specific one
#[poise::command(slash_command, category = "General")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ephemeral: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
pub async fn register(ctx: Context<'_>) -> CommandResult {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

/// Every command the reference bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    let mut commands = vec![
        // Default commands
        register(),
        help(),
        // General commands
        general::ping::ping(),
        general::server_info::server_info(),
        general::user_info::user_info(),
        // Staff commands
        staff::ui::ui(),
        staff::network::network(),
    ];

    #[cfg(feature = "youtube")]
    commands.push(general::latest_video::latest_video());

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_are_unique() {
        let commands = all();
        let mut names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        let total = names.len();
        names.dedup();

        assert_eq!(names.len(), total);
        assert!(names.contains(&"ui"));
    }

    #[test]
    fn test_staff_subcommands_are_checked() {
        for parent in [staff::ui::ui(), staff::network::network()] {
            assert!(!parent.subcommands.is_empty());
            for sub in &parent.subcommands {
                assert!(sub.checks.len() == 1, "{} is unchecked", sub.name);
            }
        }
    }
}
