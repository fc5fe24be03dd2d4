//! Core data model for loot tracking
//!
//! These types flow through the whole pipeline: raw `ItemStack` observations
//! come in from signals, merged stacks become `LootRecord`s for submission
//! and `PricedItem`s for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed quantity of one item type at a point in the signal stream.
///
/// Multiple stacks for the same item id may appear in one batch before
/// merging. `location` is an opaque hint from the environment (scene
/// coordinates of the drop); it is carried through but never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: u32,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<(i32, i32)>,
}

impl ItemStack {
    pub fn new(id: u32, quantity: i32) -> Self {
        Self {
            id,
            quantity,
            location: None,
        }
    }
}

/// Source category of a resolved loot event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LootKind {
    Npc,
    Player,
    Activity,
}

/// Wire representation of one item line inside a submitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameItem {
    pub id: u32,
    pub qty: i32,
}

/// A finalized loot record, immutable once built.
///
/// Created by the record builder, queued in the submission buffer, and
/// removed from the buffer on the next drain regardless of submission
/// outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootRecord {
    pub event_id: String,
    pub kind: LootKind,
    pub drops: Vec<GameItem>,
    pub time: DateTime<Utc>,
}

/// Display model for one merged item stack, recomputed on demand from item
/// metadata and the ignore set. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedItem {
    pub id: u32,
    pub name: String,
    pub quantity: i32,
    pub market_value: i64,
    pub high_alch_value: i64,
    pub ignored: bool,
}
