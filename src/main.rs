use dotenvy::dotenv;
use lambda_runtime::{LambdaEvent, service_fn};
use lor_buddy::{
    config::{database, env::AppConfig, settings},
    core::{filters::CommandRegistry, pipeline::CommandPipeline, search::SeaOrmExecutor},
    handler::Handler,
    interaction::{
        Dispatcher, GatewayEvent, SignatureVerifier, invoker::LambdaSelfInvoker,
        responder::DiscordResponder,
    },
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time() // CloudWatch stamps every line
        .init();

    // 2. Load .env file (local runs only, the function gets real env vars)
    dotenv().ok();

    // 3. Environment and settings file
    let app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let settings = settings::load_config_or_default(&app_config.settings_path)
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    let function_name = app_config.require_function_name()?.to_string();
    let verifier = SignatureVerifier::from_hex(app_config.require_public_key()?)
        .inspect_err(|e| error!("Cannot verify interactions: {}", e))?;

    // 4. Card database
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Card database opened"))
        .inspect_err(|e| error!("Failed to open card database: {}", e))?;

    // 5. Collaborators, built once and reused across warm invocations
    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let invoker = LambdaSelfInvoker::new(aws_sdk_lambda::Client::new(&aws), function_name);
    let responder = DiscordResponder::new(DiscordResponder::http_for(
        app_config.application_id,
        app_config.bot_token.as_deref(),
    ));
    let pipeline = CommandPipeline::new(
        Arc::new(SeaOrmExecutor::new(db)),
        CommandRegistry::default(),
        settings,
    );
    let dispatcher = Dispatcher::new(Arc::new(responder), Arc::new(invoker), Arc::new(pipeline));
    let handler = Arc::new(Handler::new(verifier, dispatcher));

    info!("Starting Lambda runtime");
    lambda_runtime::run(service_fn(move |event: LambdaEvent<GatewayEvent>| {
        let handler = Arc::clone(&handler);
        async move { handler.handle_event(event).await }
    }))
    .await
}
