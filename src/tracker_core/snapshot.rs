//! Inventory snapshot and diffing
//!
//! When a loot trigger has no explicit item list (chest messages, gathering
//! creatures), the gain is inferred by capturing the full inventory at
//! trigger time and diffing it against the contents reported by the next
//! inventory change. Only gains are reported: items sold or dropped between
//! snapshot and diff must never surface as negative loot.

use std::collections::HashMap;

use super::signals::GameView;
use super::types::ItemStack;

/// Point-in-time capture of inventory contents as item id -> total quantity.
///
/// Owned exclusively by the correlator. At most one snapshot is live at a
/// time; a new trigger overwrites any pending one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    counts: HashMap<u32, i64>,
}

impl InventorySnapshot {
    /// Capture the current player inventory through the game view.
    ///
    /// Returns `None` when the inventory source is unavailable, which means
    /// "not yet loaded" rather than "empty". Zero and negative quantities
    /// are not recorded.
    pub fn take(view: &dyn GameView) -> Option<Self> {
        let contents = view.inventory_contents()?;
        Some(Self::from_contents(&contents))
    }

    /// Build a snapshot directly from container contents.
    pub fn from_contents(contents: &[(u32, i32)]) -> Self {
        let mut counts: HashMap<u32, i64> = HashMap::with_capacity(contents.len());
        for &(id, quantity) in contents {
            if quantity > 0 {
                *counts.entry(id).or_insert(0) += i64::from(quantity);
            }
        }
        Self { counts }
    }

    /// Positive difference of `new_contents` against this snapshot.
    ///
    /// For each item in the new contents the gain is
    /// `max(0, new_count - old_count)`; zero gains are omitted and items
    /// present only in the snapshot are ignored entirely. Aggregate gains
    /// beyond `i32::MAX` saturate rather than wrapping.
    pub fn diff(&self, new_contents: &[(u32, i32)]) -> Vec<ItemStack> {
        let mut new_counts: HashMap<u32, i64> = HashMap::with_capacity(new_contents.len());
        let mut order: Vec<u32> = Vec::with_capacity(new_contents.len());
        for &(id, quantity) in new_contents {
            if quantity <= 0 {
                continue;
            }
            if !new_counts.contains_key(&id) {
                order.push(id);
            }
            *new_counts.entry(id).or_insert(0) += i64::from(quantity);
        }

        let mut gains = Vec::new();
        for id in order {
            let new_count = new_counts[&id];
            let old_count = self.counts.get(&id).copied().unwrap_or(0);
            let gained = new_count - old_count;
            if gained > 0 {
                let quantity = i32::try_from(gained).unwrap_or(i32::MAX);
                gains.push(ItemStack::new(id, quantity));
            }
        }

        gains
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
