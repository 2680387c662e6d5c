use dotenvy::dotenv;
use lor_buddy::{
    bot::{self, BotData},
    config::{database, env::AppConfig, settings},
    core::{filters::CommandRegistry, pipeline::CommandPipeline, search::SeaOrmExecutor},
    errors::Result,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Environment and settings file
    let app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let settings = settings::load_config_or_default(&app_config.settings_path)?;
    let token = app_config
        .require_bot_token()
        .inspect_err(|e| error!("{}", e))?;

    // 4. Card database
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Card database opened"))
        .inspect_err(|e| error!("Failed to open card database: {}", e))?;

    // 5. Run the bot
    let pipeline = CommandPipeline::new(
        Arc::new(SeaOrmExecutor::new(db)),
        CommandRegistry::default(),
        settings,
    );
    bot::run_bot(token, app_config.guild_id, BotData::new(Arc::new(pipeline))).await
}
