use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pharmacare::bot::message_handler;
use pharmacare::brain::Brain;
use pharmacare::config::BotConfig;
use pharmacare::http::{Fetch, HttpFetcher};
use pharmacare::lm::{HfInferenceClient, TextGenerator};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pharmacare=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting PharmaCare Telegram Bot");

    let config = BotConfig::from_env().context("Failed to load configuration")?;
    let token = config
        .telegram_token
        .clone()
        .context("TELEGRAM_BOT_TOKEN must be set")?;

    let fetch: Arc<dyn Fetch> =
        Arc::new(HttpFetcher::new(config.http.clone()).context("Failed to build HTTP client")?);

    let generator: Option<Arc<dyn TextGenerator>> = match &config.lm {
        Some(lm) => {
            info!(model = %lm.model, "Language model enabled");
            let client: Arc<dyn TextGenerator> = Arc::new(
                HfInferenceClient::new(lm.clone()).context("Failed to build inference client")?,
            );
            Some(client)
        }
        None => {
            warn!("HF_API_KEY not set; planner, rewriting and text tools are disabled");
            None
        }
    };

    if config.weather_api_key.is_none() {
        info!("WEATHER_API_KEY not set; using keyless weather providers only");
    }

    let brain = Arc::new(Brain::new(&config, fetch, generator));

    let bot = Bot::new(token);
    info!("Bot initialized, starting dispatcher");

    let handler = Update::filter_message().endpoint(message_handler);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![brain])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
