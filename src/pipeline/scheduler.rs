//! Drain-and-submit and the price refresh task
//!
//! `submit_queued` is the single drain path; the ingestion loop invokes it
//! on its flush timer and once at shutdown, so there is never more than one
//! drainer. It touches nothing but the submission buffer and the network.

use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::client::metadata::HttpItemMetadataProvider;
use crate::client::persistence::PersistenceClient;

use super::buffer::SubmissionBuffer;

/// Drain the buffer and attempt one batch submission.
///
/// When no client exists or saving is disabled, nothing is drained: records
/// stay queued until a session appears. Once drained, a failed batch is
/// lost; delivery is at-most-once and the next period submits whatever
/// accumulated since.
///
/// Returns the number of records drained.
pub async fn submit_queued(
    buffer: &SubmissionBuffer,
    client: Option<&dyn PersistenceClient>,
    save_loot: bool,
) -> usize {
    let Some(client) = client else {
        return 0;
    };
    if !save_loot {
        return 0;
    }

    let batch = buffer.drain();
    if batch.is_empty() {
        return 0;
    }

    match client.submit_batch(&batch).await {
        Ok(()) => {
            log::debug!("Submitted {} loot records", batch.len());
        }
        Err(e) => {
            log::error!("Failed to submit batch of {} records: {}", batch.len(), e);
        }
    }

    batch.len()
}

/// Periodic item metadata refresh loop.
pub async fn price_refresh_task(provider: Arc<HttpItemMetadataProvider>, interval_secs: u64) {
    log::info!("💰 Starting price refresh (interval: {}s)", interval_secs);

    let mut timer = interval(Duration::from_secs(interval_secs));

    loop {
        timer.tick().await;
        match provider.refresh().await {
            Ok(count) => log::debug!("Price refresh complete: {} items", count),
            Err(e) => log::warn!("Price refresh failed: {}", e),
        }
    }
}
