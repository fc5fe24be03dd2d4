//! Loot tracker runtime
//!
//! Headless wiring for the correlation core: reads signal envelopes as
//! newline-delimited JSON on stdin, runs them through the tracker engine,
//! and periodically submits queued records to the configured loot store.
//! EOF on stdin triggers one final best-effort drain.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use lootflow::client::metadata::{
    HttpItemMetadataProvider, ItemMetadataProvider, StaticItemMetadataProvider,
};
use lootflow::client::persistence::{HttpPersistenceClient, PersistenceClient};
use lootflow::config::{ConfigStore, JsonFileConfigStore, RuntimeConfig};
use lootflow::pipeline::display::LogDisplaySink;
use lootflow::pipeline::engine::{hydrate_history, TrackerEngine};
use lootflow::pipeline::ingestion::start_signal_ingestion;
use lootflow::pipeline::scheduler::price_refresh_task;
use lootflow::pipeline::SubmissionBuffer;
use lootflow::tracker_core::signals::SignalEnvelope;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = RuntimeConfig::from_env()?;

    log::info!("🚀 Starting loot tracker runtime");
    log::info!("📊 Configuration:");
    log::info!(
        "   Loot store: {}",
        config.store_url.as_deref().unwrap_or("disabled")
    );
    log::info!(
        "   Item feed:  {}",
        config.item_api_url.as_deref().unwrap_or("disabled")
    );
    log::info!("   Settings:   {}", config.settings_path);
    log::info!("   Submit every {}s", config.submit_interval_secs);

    let settings: Arc<dyn ConfigStore> =
        Arc::new(JsonFileConfigStore::load(&config.settings_path)?);

    // Item metadata: cached HTTP feed when configured, otherwise every
    // lookup degrades to a placeholder entry.
    let metadata: Arc<dyn ItemMetadataProvider> = match &config.item_api_url {
        Some(url) => {
            let provider = Arc::new(HttpItemMetadataProvider::new(url)?);
            match provider.refresh().await {
                Ok(count) => log::info!("Loaded metadata for {} items", count),
                Err(e) => log::warn!("Initial item feed load failed: {}", e),
            }
            tokio::spawn(price_refresh_task(
                provider.clone(),
                config.price_refresh_secs,
            ));
            provider
        }
        None => Arc::new(StaticItemMetadataProvider::new()),
    };

    // A remote session exists only with both an endpoint and a token.
    let client: Option<Arc<dyn PersistenceClient>> =
        match (&config.store_url, &config.session_token) {
            (Some(url), Some(token)) => Some(Arc::new(HttpPersistenceClient::new(url, token)?)),
            _ => {
                log::info!("No loot store session, records will stay queued locally");
                None
            }
        };

    let display = Arc::new(LogDisplaySink);
    let buffer = Arc::new(SubmissionBuffer::new());
    let engine = Arc::new(Mutex::new(TrackerEngine::new(
        metadata.clone(),
        settings.clone(),
        display.clone(),
        buffer,
    )));

    // Replay stored history into the display before live signals start.
    if let Some(client) = &client {
        let ignored = engine.lock().unwrap().ignored_handle();
        hydrate_history(
            client.as_ref(),
            metadata.as_ref(),
            &ignored,
            display.as_ref(),
            settings.as_ref(),
        )
        .await;
    }

    let (tx, rx) = mpsc::channel::<SignalEnvelope>(1024);
    let ingestion = tokio::spawn(start_signal_ingestion(
        rx,
        engine,
        client,
        settings,
        config.submit_interval_secs,
    ));

    // Feed stdin lines into the signal channel; EOF closes it and lets the
    // ingestion loop run its final drain.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<SignalEnvelope>(&line) {
            Ok(envelope) => {
                if tx.send(envelope).await.is_err() {
                    break;
                }
            }
            Err(e) => log::warn!("Skipping malformed signal line: {}", e),
        }
    }
    drop(tx);

    ingestion.await?;
    log::info!("✅ Loot tracker runtime stopped");
    Ok(())
}
