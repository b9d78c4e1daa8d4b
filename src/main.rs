use std::error::Error;
use std::sync::Arc;

use rroutine::auth::TokenTableVerifier;
use rroutine::clock::SystemClock;
use rroutine::config::AppConfig;
use rroutine::data::{open_database, shared};
use tracing::{error, info};

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let figment = rocket::Config::figment();
    let config = AppConfig::from_figment(&figment)?;

    let connection = open_database(&config.database_path)?;
    info!(path = %config.database_path.display(), "opened routine database");

    if config.auth_tokens.is_empty() {
        info!("no auth tokens configured, authenticated routes will reject every request");
    }
    let verifier = Arc::new(TokenTableVerifier::new(config.auth_tokens));

    if let Err(e) = rroutine::build_rocket(figment, shared(connection), verifier, Arc::new(SystemClock))
        .launch()
        .await
    {
        error!("server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
