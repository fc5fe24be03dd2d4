//! Tracker engine - orchestration layer over the correlation core
//!
//! Wires the pure correlator to its collaborators:
//!
//! ```text
//! Signal (+ GameView)
//!     ↓
//! TrackerEngine::process_signal()
//!     ↓
//! EventCorrelator → stacker::merge → builder (metadata + ignore set)
//!     ↓                                   ↓
//! SubmissionBuffer (when saving)      DisplaySink
//! ```
//!
//! One engine instance per session. The engine is driven from a single
//! signal-handling context; only the submission buffer is shared with the
//! flush scheduler.

use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::client::metadata::ItemMetadataProvider;
use crate::client::persistence::PersistenceClient;
use crate::config::ConfigStore;
use crate::tracker_core::correlator::{EventCorrelator, ResolvedLoot};
use crate::tracker_core::ignore::IgnoreSet;
use crate::tracker_core::signals::{GameView, Signal};
use crate::tracker_core::{builder, stacker};

use super::buffer::SubmissionBuffer;
use super::display::DisplaySink;

pub struct TrackerEngine {
    correlator: EventCorrelator,
    metadata: Arc<dyn ItemMetadataProvider>,
    ignored: Arc<RwLock<IgnoreSet>>,
    config: Arc<dyn ConfigStore>,
    display: Arc<dyn DisplaySink>,
    buffer: Arc<SubmissionBuffer>,
}

impl TrackerEngine {
    /// Create an engine, loading the ignore set from the config store.
    pub fn new(
        metadata: Arc<dyn ItemMetadataProvider>,
        config: Arc<dyn ConfigStore>,
        display: Arc<dyn DisplaySink>,
        buffer: Arc<SubmissionBuffer>,
    ) -> Self {
        let ignored = IgnoreSet::from_csv(&config.ignored_items());
        Self {
            correlator: EventCorrelator::new(),
            metadata,
            ignored: Arc::new(RwLock::new(ignored)),
            config,
            display,
            buffer,
        }
    }

    /// Feed one signal through correlation, valuation, display and queueing.
    ///
    /// Returns the resolved event name when the signal completed a loot
    /// occurrence. Valuation failures degrade to placeholder entries; the
    /// display is always notified before anything is queued.
    pub fn process_signal(&mut self, signal: &Signal, view: &dyn GameView) -> Option<String> {
        let resolved = self.correlator.handle(signal, view)?;
        self.emit(resolved)
    }

    fn emit(&self, resolved: ResolvedLoot) -> Option<String> {
        let merged = stacker::merge(resolved.items);

        let entries = {
            let ignored = self.ignored.read().unwrap();
            builder::build_entries(self.metadata.as_ref(), &ignored, &merged)
        };
        self.display
            .add_record(&resolved.event, resolved.combat_level, &entries);

        if self.config.save_loot() {
            let record = builder::build_record(&resolved.event, resolved.kind, &merged, Utc::now());
            self.buffer.enqueue(record);
        }

        Some(resolved.event)
    }

    /// Toggle an item name in the ignore set, persist the list and request a
    /// display refresh. A persistence failure keeps the in-memory change.
    pub fn toggle_item(&self, name: &str, ignored: bool) {
        let changed = {
            let mut set = self.ignored.write().unwrap();
            set.set_ignored(name, ignored)
        };
        if !changed {
            return;
        }

        let csv = self.ignored.read().unwrap().to_csv();
        if let Err(e) = self.config.set_ignored_items(&csv) {
            log::error!("Failed to persist ignored items: {}", e);
        }
        self.display.refresh_ignored();
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.read().unwrap().is_ignored(name)
    }

    /// Shared handle to the ignore set for read-side collaborators.
    pub fn ignored_handle(&self) -> Arc<RwLock<IgnoreSet>> {
        self.ignored.clone()
    }

    pub fn buffer(&self) -> Arc<SubmissionBuffer> {
        self.buffer.clone()
    }
}

/// Replay previously stored records into the display at startup.
///
/// Runs outside the signal-handling context; a fetch failure is logged and
/// skipped, hydration is never load-bearing.
pub async fn hydrate_history(
    client: &dyn PersistenceClient,
    metadata: &dyn ItemMetadataProvider,
    ignored: &RwLock<IgnoreSet>,
    display: &dyn DisplaySink,
    config: &dyn ConfigStore,
) {
    if !config.sync_panel() {
        return;
    }

    let mut records = match client.fetch_history().await {
        Ok(records) => records,
        Err(e) => {
            log::debug!("Unable to look up stored loot: {}", e);
            return;
        }
    };
    log::debug!("Loaded {} stored loot records", records.len());

    records.sort_by_key(|record| record.time);

    for record in records {
        let stacks: Vec<_> = record
            .drops
            .iter()
            .map(|drop| crate::tracker_core::types::ItemStack::new(drop.id, drop.qty))
            .collect();
        let entries = {
            let ignored = ignored.read().unwrap();
            builder::build_entries(metadata, &ignored, &stacks)
        };
        display.add_record(&record.event_id, None, &entries);
    }
}
