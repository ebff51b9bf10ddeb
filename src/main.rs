//! geointel — demo entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config (credentials from env)
//!   3. Init logger at configured level
//!   4. Run one trending-topics call and print the result

use geointel::{AppError, Client};
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = geointel::config::load()?;
    geointel::logger::init(&config.log_level)?;

    info!(
        primary_model = %config.primary.model,
        fallback_configured = config.fallback_api_key.is_some(),
        log_level = %config.log_level,
        "config loaded"
    );

    let client = Client::new(&config)?;
    let outcome = client.trending_topic_suggestions(&[]).await?;

    if outcome.used_fallback {
        println!("(served by fallback provider)");
    }
    for suggestion in &outcome.data {
        println!("- {suggestion}");
    }

    Ok(())
}
