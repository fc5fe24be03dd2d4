//! Item stack merging
//!
//! A single loot occurrence can report the same item id several times (split
//! drop piles, partial container reads). Merging collapses those into one
//! canonical quantity per item before valuation and submission.

use std::collections::HashMap;

use super::types::ItemStack;

/// Merge a batch of stacks into one entry per distinct item id.
///
/// Quantities for the same id are summed. The order of first appearance is
/// preserved, and the location hint of the first occurrence wins. Quantities
/// are assumed positive upstream; zero or negative values pass through
/// unchanged rather than being filtered.
pub fn merge(items: Vec<ItemStack>) -> Vec<ItemStack> {
    let mut merged: Vec<ItemStack> = Vec::with_capacity(items.len());
    let mut index: HashMap<u32, usize> = HashMap::with_capacity(items.len());

    for item in items {
        match index.get(&item.id) {
            Some(&at) => merged[at].quantity += item.quantity,
            None => {
                index.insert(item.id, merged.len());
                merged.push(item);
            }
        }
    }

    merged
}
