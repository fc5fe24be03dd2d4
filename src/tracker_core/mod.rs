//! Tracker Core - Loot Event Correlation Engine
//!
//! The pure heart of the tracker: no I/O, no clocks, no network. Signals go
//! in, resolved loot comes out.
//!
//! # Architecture
//!
//! ```text
//! Signal (+ GameView context)
//!     ↓
//! EventCorrelator (trigger matching, snapshot/diff, latches)
//!     ↓
//! stacker::merge (one canonical quantity per item id)
//!     ↓
//! builder (valuation via item metadata + ignore flags)
//!     ↓
//! LootRecord → SubmissionBuffer   /   PricedItem[] → DisplaySink
//! ```

pub mod builder;
pub mod correlator;
pub mod ignore;
pub mod signals;
pub mod snapshot;
pub mod stacker;
pub mod types;

pub use correlator::{EventCorrelator, ResolvedLoot};
pub use ignore::IgnoreSet;
pub use signals::{
    ChatKind, ClientState, ContainerKind, GameView, RewardContainerKind, Signal, SignalEnvelope,
    WorldContext,
};
pub use snapshot::InventorySnapshot;
pub use types::{GameItem, ItemStack, LootKind, LootRecord, PricedItem};
