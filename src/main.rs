#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use anyhow::Result;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod api;
mod config;
mod error;
mod notify;
mod status;
mod watcher;

use api::{PracticumApi, StatusSource};
use config::Config;
use notify::{Notifier, TelegramNotifier};
use watcher::{PollState, Watcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // The only fatal condition: refuse to start without the three secrets.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("startup aborted: {e}");
            std::process::exit(1);
        }
    };

    let source: Arc<dyn StatusSource> =
        Arc::new(PracticumApi::new(&config.endpoint, &config.practicum_token));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        &config.telegram_token,
        &config.telegram_chat_id,
    ));

    let watcher = Watcher::new(source, notifier, &config);
    let state = PollState::new(config.initial_backoff_secs);

    tokio::select! {
        () = watcher.run(state) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, stopping");
        }
    }

    Ok(())
}
