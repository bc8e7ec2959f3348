use anyhow::Result;
use dotenvy::dotenv;
use log::{info, warn};

use event_reminder::core::Config;
use event_reminder::database::Database;
use event_reminder::features::delivery::HttpDispatcher;
use event_reminder::features::enrichment::{Enricher, OpenAiEnricher, StaticEnricher};
use event_reminder::features::reminders::ReminderScheduler;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting event reminder daemon...");

    let database = Database::new(&config.database_path);
    if config.init_schema {
        database.initialize()?;
        info!("📄 Schema ready at {}", config.database_path);
    }

    let enricher: Box<dyn Enricher> = match &config.openai_api_key {
        Some(key) => Box::new(OpenAiEnricher::new(
            key,
            &config.openai_base_url,
            config.openai_model.clone(),
            config.enrichment_timeout,
        )),
        None => {
            warn!("OPENAI_API_KEY not set - reminders will use the fallback message");
            Box::new(StaticEnricher)
        }
    };

    let dispatcher = HttpDispatcher::new(
        config.chat_api_url.clone(),
        config.email_api_url.clone(),
        config.phone_country_code.clone(),
        config.http_timeout,
    )?;

    let scheduler = ReminderScheduler::new(database, enricher, Box::new(dispatcher), &config);

    tokio::select! {
        _ = scheduler.run_forever() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping reminder daemon");
        }
    }

    Ok(())
}
