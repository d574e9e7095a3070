use guildkit::commands;
use guildkit::setup::BotSetup;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), guildkit::Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("guildkit=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    let setup = BotSetup::from_env(None).inspect_err(|e| error!("Bot setup failed: {}", e))?;

    setup
        .run(commands::all())
        .await
        .inspect_err(|e| error!("Bot stopped: {}", e))?;

    Ok(())
}
