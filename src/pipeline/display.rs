//! Display collaborator
//!
//! The core never renders anything itself; it hands each resolved record to
//! a `DisplaySink`. The display path is decoupled from valuation and
//! submission failures: it always receives the merged stacks, placeholders
//! included.

use crate::tracker_core::types::PricedItem;

pub trait DisplaySink: Send + Sync {
    /// One resolved loot record. `combat_level` is `None` for activity loot.
    fn add_record(&self, event: &str, combat_level: Option<u16>, items: &[PricedItem]);

    /// The ignore set changed; rendered totals should be recomputed.
    fn refresh_ignored(&self);
}

/// Log-only sink used by the headless runtime.
pub struct LogDisplaySink;

impl DisplaySink for LogDisplaySink {
    fn add_record(&self, event: &str, combat_level: Option<u16>, items: &[PricedItem]) {
        let total: i64 = items
            .iter()
            .filter(|item| !item.ignored)
            .map(|item| item.market_value)
            .sum();

        let source = match combat_level {
            Some(level) => format!("{} (lvl {})", event, level),
            None => event.to_string(),
        };

        log::info!("💰 {}: {} item(s) worth {} gp", source, items.len(), total);
        for item in items {
            log::debug!(
                "   {} x{} = {} gp{}",
                item.name,
                item.quantity,
                item.market_value,
                if item.ignored { " (ignored)" } else { "" }
            );
        }
    }

    fn refresh_ignored(&self) {
        log::debug!("Ignored items changed, refreshing display totals");
    }
}
