//! Signal ingestion - async channel processor for loot signals
//!
//! The single signal-handling context of the tracker. Signals arrive on an
//! mpsc channel in delivery order and are processed one at a time, which is
//! the ordering precondition the correlator relies on. The periodic flush
//! runs on the same select loop but only ever touches the submission
//! buffer, never correlator state.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{interval, Duration};

use crate::client::persistence::PersistenceClient;
use crate::config::ConfigStore;
use crate::tracker_core::signals::SignalEnvelope;

use super::engine::TrackerEngine;
use super::scheduler::submit_queued;

/// Consume signal envelopes until the channel closes.
///
/// Main loop:
/// 1. Receive an envelope and run it through the engine
/// 2. On the flush timer, drain-and-submit queued records
/// 3. On channel close, perform one final best-effort drain and exit
pub async fn start_signal_ingestion(
    mut rx: mpsc::Receiver<SignalEnvelope>,
    engine: Arc<Mutex<TrackerEngine>>,
    client: Option<Arc<dyn PersistenceClient>>,
    config: Arc<dyn ConfigStore>,
    flush_interval_secs: u64,
) {
    log::info!("🚀 Starting signal ingestion");
    log::info!("   └─ Flush interval: {}s", flush_interval_secs);

    let mut flush_timer = interval(Duration::from_secs(flush_interval_secs));
    // The immediate first tick would flush an empty queue; skip it.
    flush_timer.tick().await;

    let mut signal_count = 0u64;
    let buffer = engine.lock().unwrap().buffer();

    loop {
        tokio::select! {
            maybe_envelope = rx.recv() => {
                match maybe_envelope {
                    Some(envelope) => {
                        let resolved = {
                            let mut engine_guard = engine.lock().unwrap();
                            engine_guard.process_signal(&envelope.signal, &envelope.context)
                        };
                        signal_count += 1;

                        if let Some(event) = resolved {
                            log::debug!("Resolved loot event: {} (signal #{})", event, signal_count);
                        }
                    }
                    None => {
                        log::info!("Signal channel closed after {} signals", signal_count);

                        // Final best-effort drain before exit.
                        let submitted = submit_queued(
                            &buffer,
                            client.as_deref(),
                            config.save_loot(),
                        )
                        .await;
                        if submitted > 0 {
                            log::info!("Final flush drained {} records", submitted);
                        }
                        break;
                    }
                }
            }

            _ = flush_timer.tick() => {
                let drained = submit_queued(&buffer, client.as_deref(), config.save_loot()).await;
                if drained > 0 {
                    log::debug!("Periodic flush drained {} records", drained);
                }
            }
        }
    }

    log::info!("✅ Signal ingestion stopped");
}
