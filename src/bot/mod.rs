//! Bot layer - websocket gateway interface for local development
//!
//! The gateway bot answers the same slash commands as the Lambda, through the
//! same `CommandPipeline`, but as a long-running process. It needs no public
//! endpoint, which makes it the easy way to try commands against a test guild.

/// Slash command implementations
pub mod commands;

use crate::{
    core::pipeline::CommandPipeline,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Pipeline answering every command
    pub pipeline: Arc<CommandPipeline>,
}

impl BotData {
    /// Creates a new `BotData` around a pipeline.
    #[must_use]
    pub const fn new(pipeline: Arc<CommandPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Poise context used by the commands.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            let notice = ctx.data().pipeline.error_notice();
            if let Err(e) = ctx.send(commands::reply(&notice)).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to the gateway and serves commands until the connection ends.
///
/// Commands are registered in `guild_id` when given (instant updates),
/// globally otherwise.
///
/// # Errors
/// Returns an error if the client cannot be built or the gateway connection
/// fails.
#[instrument(skip(token, data))]
pub async fn run_bot(token: &str, guild_id: Option<u64>, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                let commands = &framework.options().commands;
                if let Some(guild_id) = guild_id {
                    let guild_id = serenity::GuildId::new(guild_id);
                    poise::builtins::register_in_guild(ctx, commands, guild_id).await?;
                    info!("Registered commands in guild {}", guild_id);
                } else {
                    poise::builtins::register_globally(ctx, commands).await?;
                    info!("Registered commands globally");
                }
                Ok(data)
            })
        })
        .build();

    // Slash commands need no privileged intents
    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
