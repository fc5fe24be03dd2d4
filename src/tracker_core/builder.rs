//! Loot record building and valuation
//!
//! Turns merged item stacks into submitted `LootRecord`s and priced display
//! entries. Valuation resolves display names and prices through the item
//! metadata collaborator; a metadata miss degrades that single item to a
//! zero-valued placeholder and never aborts the batch.

use chrono::{DateTime, Utc};

use crate::client::metadata::ItemMetadataProvider;

use super::ignore::IgnoreSet;
use super::types::{GameItem, ItemStack, LootKind, LootRecord, PricedItem};

/// Fraction of an item's store price returned by high alchemy.
pub const HIGH_ALCHEMY_MULTIPLIER: f64 = 0.6;

/// Price one merged stack for display.
///
/// Noted variants alias to their base item id for market pricing; the high
/// alchemy value always derives from the store price of the observed id.
pub fn build_priced_item(
    metadata: &dyn ItemMetadataProvider,
    ignored: &IgnoreSet,
    id: u32,
    quantity: i32,
) -> PricedItem {
    let meta = match metadata.resolve(id) {
        Ok(meta) => meta,
        Err(e) => {
            log::debug!("No metadata for item {}: {}", id, e);
            return PricedItem {
                id,
                name: "Unknown item".to_string(),
                quantity,
                market_value: 0,
                high_alch_value: 0,
                ignored: false,
            };
        }
    };

    let unit_price = match meta.noted_link {
        Some(base_id) => metadata
            .resolve(base_id)
            .map(|base| base.market_price)
            .unwrap_or(meta.market_price),
        None => meta.market_price,
    };

    let market_value = unit_price * i64::from(quantity);
    let high_alch_value =
        (meta.store_price as f64 * HIGH_ALCHEMY_MULTIPLIER).round() as i64 * i64::from(quantity);
    let is_ignored = ignored.is_ignored(&meta.name);

    PricedItem {
        id,
        name: meta.name,
        quantity,
        market_value,
        high_alch_value,
        ignored: is_ignored,
    }
}

/// Price a whole merged batch, preserving the input order.
pub fn build_entries(
    metadata: &dyn ItemMetadataProvider,
    ignored: &IgnoreSet,
    stacks: &[ItemStack],
) -> Vec<PricedItem> {
    stacks
        .iter()
        .map(|stack| build_priced_item(metadata, ignored, stack.id, stack.quantity))
        .collect()
}

/// Build the immutable record submitted to the remote store.
pub fn build_record(
    event: &str,
    kind: LootKind,
    stacks: &[ItemStack],
    time: DateTime<Utc>,
) -> LootRecord {
    LootRecord {
        event_id: event.to_string(),
        kind,
        drops: stacks
            .iter()
            .map(|stack| GameItem {
                id: stack.id,
                qty: stack.quantity,
            })
            .collect(),
        time,
    }
}
