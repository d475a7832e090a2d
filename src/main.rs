use tracing::info;
use tracing_subscriber::EnvFilter;

use heimdall::config::Config;
use heimdall::startup;
use heimdall::util::cancel::CancellationFlag;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().expect("failed to load configuration");

    let db = startup::connect_to_database(&config)
        .await
        .expect("failed to connect to database");
    let cache = startup::connect_to_cache(&config)
        .await
        .expect("failed to connect to Valkey");
    let esi_client = startup::build_esi_client(&config).expect("failed to build ESI client");
    let discord_client =
        startup::build_discord_client(&config).expect("failed to build Discord client");
    let oauth_client =
        startup::build_discord_oauth_client(&config).expect("failed to build OAuth client");
    let cipher = startup::build_token_cipher(&config).expect("failed to derive token cipher");
    let http_client = reqwest::Client::new();

    let shutdown = CancellationFlag::new();

    let state = startup::build_scheduler_state(
        &config,
        db,
        cache,
        esi_client,
        discord_client,
        http_client,
        oauth_client,
        cipher,
        shutdown.clone(),
    );

    startup::start_scheduler(state)
        .await
        .expect("failed to start scheduler");

    info!("Heimdall started; reconciliation jobs scheduled");

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");

    info!("Shutdown signal received; cancelling in-flight work");
    shutdown.cancel();

    // Give in-flight batches a moment to notice the flag and finish their
    // bookkeeping before the process exits.
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
}
