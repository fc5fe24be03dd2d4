//! Event correlator state machine
//!
//! The correlator is the piece that decides what constitutes one loot
//! occurrence. It consumes heterogeneous signals one at a time and in
//! arrival order, and resolves them into `ResolvedLoot` outputs:
//!
//! - Structured NPC/player loot resolves immediately, contents included.
//! - Reward container surfaces resolve immediately from their contents,
//!   subject to region gates and a per-instance duplicate latch.
//! - Chest and gathering triggers arrive as chat text with no item list;
//!   the correlator snapshots the inventory and resolves on the next
//!   player-inventory change by diffing.
//!
//! World context (regions, inventory) is queried through [`GameView`] at
//! signal-arrival time, never cached across signals. At most one pending
//! snapshot exists; a new trigger overwrites a stale one.

use once_cell::sync::Lazy;
use regex::Regex;

use super::signals::{
    ChatKind, ClientState, ContainerKind, GameView, RewardContainerKind, Signal,
};
use super::snapshot::InventorySnapshot;
use super::types::{ItemStack, LootKind};

static CLUE_SCROLL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"You have completed [0-9]+ ([a-z]+) Treasure Trails\.").unwrap());
static LARRAN_LOOTED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^You have opened Larran's (big|small) chest .*").unwrap());

const CHEST_LOOTED_MESSAGE: &str = "You find some treasure in the chest!";

const HERBIBOAR_LOOTED_MESSAGE: &str =
    "You harvest herbs from the herbiboar, whereupon it escapes.";
const HERBIBOAR_EVENT: &str = "Herbiboar";

const HESPORI_LOOTED_MESSAGE: &str = "You have successfully cleared this patch for new crops.";
const HESPORI_EVENT: &str = "Hespori";
const HESPORI_REGION: u32 = 5021;

const GAUNTLET_LOOTED_MESSAGE: &str = "You open the chest.";
const GAUNTLET_EVENT: &str = "The Gauntlet";
const GAUNTLET_LOBBY_REGION: u32 = 12127;

const THEATRE_OF_BLOOD_REGION: u32 = 12867;

/// Chest events keyed by the region the chest stands in.
const CHEST_EVENT_TYPES: &[(u32, &str)] = &[
    (5179, "Brimstone Chest"),
    (11573, "Crystal Chest"),
    (12093, "Larran's big chest"),
    (13113, "Larran's small chest"),
    (13151, "Elven Crystal Chest"),
];

/// Player kills inside Last Man Standing are a hard exclusion.
const LAST_MAN_STANDING_REGIONS: &[u32] = &[13658, 13659, 13914, 13915, 13916];

fn chest_event_for_region(region: u32) -> Option<&'static str> {
    CHEST_EVENT_TYPES
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, name)| *name)
}

fn clue_event_for_tier(tier: &str) -> Option<&'static str> {
    match tier {
        "beginner" => Some("Clue Scroll (Beginner)"),
        "easy" => Some("Clue Scroll (Easy)"),
        "medium" => Some("Clue Scroll (Medium)"),
        "hard" => Some("Clue Scroll (Hard)"),
        "elite" => Some("Clue Scroll (Elite)"),
        "master" => Some("Clue Scroll (Master)"),
        _ => None,
    }
}

/// A loot occurrence the correlator has fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLoot {
    pub event: String,
    pub kind: LootKind,
    /// Combat level of the source, `None` for activity loot.
    pub combat_level: Option<u16>,
    pub items: Vec<ItemStack>,
}

/// A snapshot-deferred event waiting for its inventory change.
///
/// `snapshot` is `None` when the inventory was unavailable at trigger time;
/// such an event resolves to nothing.
#[derive(Debug, Clone)]
struct PendingEvent {
    event: String,
    snapshot: Option<InventorySnapshot>,
}

/// The correlation state machine. One instance per session; owns all
/// mutable correlation state so independent instances never cross-talk.
#[derive(Debug, Default)]
pub struct EventCorrelator {
    pending: Option<PendingEvent>,
    clue_tier: Option<&'static str>,
    chest_looted: bool,
}

impl EventCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one signal through the state machine.
    ///
    /// Precondition: signals are delivered one at a time, in arrival order.
    pub fn handle(&mut self, signal: &Signal, view: &dyn GameView) -> Option<ResolvedLoot> {
        match signal {
            Signal::NpcLoot {
                name,
                combat_level,
                items,
            } => Some(ResolvedLoot {
                event: name.clone(),
                kind: LootKind::Npc,
                combat_level: Some(*combat_level),
                items: items.clone(),
            }),

            Signal::PlayerLoot {
                name,
                combat_level,
                items,
            } => {
                if self.at_last_man_standing(view) {
                    log::debug!("Dropping player loot from {} inside LMS", name);
                    return None;
                }
                Some(ResolvedLoot {
                    event: name.clone(),
                    kind: LootKind::Player,
                    combat_level: Some(*combat_level),
                    items: items.clone(),
                })
            }

            Signal::RewardContainer { kind, contents } => {
                self.on_reward_container(*kind, contents, view)
            }

            Signal::ChatMessage { kind, text } => {
                if !matches!(kind, ChatKind::GameMessage | ChatKind::Spam) {
                    return None;
                }
                self.on_chat_message(text, view);
                None
            }

            Signal::InventoryChanged {
                container,
                contents,
            } => self.on_inventory_changed(*container, contents),

            Signal::GameState { state } => {
                if *state == ClientState::Loading {
                    // Area transition: the reward surface may legitimately be
                    // shown again in the new instance.
                    self.chest_looted = false;
                }
                None
            }
        }
    }

    fn on_chat_message(&mut self, text: &str, view: &dyn GameView) {
        if text == CHEST_LOOTED_MESSAGE || LARRAN_LOOTED_PATTERN.is_match(text) {
            let Some(region) = view.region_id() else {
                return;
            };
            if let Some(event) = chest_event_for_region(region) {
                self.open_pending(event, view);
            }
            return;
        }

        if text == HERBIBOAR_LOOTED_MESSAGE {
            self.open_pending(HERBIBOAR_EVENT, view);
            return;
        }

        let region = view.region_id();

        if region == Some(HESPORI_REGION) && text == HESPORI_LOOTED_MESSAGE {
            self.open_pending(HESPORI_EVENT, view);
            return;
        }

        if region == Some(GAUNTLET_LOBBY_REGION) && text == GAUNTLET_LOOTED_MESSAGE {
            self.open_pending(GAUNTLET_EVENT, view);
            return;
        }

        if let Some(captures) = CLUE_SCROLL_PATTERN.captures(text) {
            if let Some(event) = clue_event_for_tier(&captures[1]) {
                self.clue_tier = Some(event);
            }
        }
    }

    /// Take an inventory snapshot and open a deferred event, overwriting any
    /// stale pending one.
    fn open_pending(&mut self, event: &str, view: &dyn GameView) {
        let snapshot = InventorySnapshot::take(view);
        if snapshot.is_none() {
            log::debug!("Inventory unavailable at trigger for {}", event);
        }
        self.pending = Some(PendingEvent {
            event: event.to_string(),
            snapshot,
        });
    }

    fn on_reward_container(
        &mut self,
        kind: RewardContainerKind,
        contents: &[ItemStack],
        view: &dyn GameView,
    ) -> Option<ResolvedLoot> {
        let event = match kind {
            RewardContainerKind::Barrows => "Barrows".to_string(),
            RewardContainerKind::ChambersOfXeric => {
                if self.chest_looted {
                    return None;
                }
                self.chest_looted = true;
                "Chambers of Xeric".to_string()
            }
            RewardContainerKind::TheatreOfBlood => {
                if self.chest_looted {
                    return None;
                }
                if view.region_id() != Some(THEATRE_OF_BLOOD_REGION) {
                    return None;
                }
                self.chest_looted = true;
                "Theatre of Blood".to_string()
            }
            RewardContainerKind::ClueScroll => match self.clue_tier {
                Some(event) => event.to_string(),
                // The shared reward surface fired without a tier-resolving
                // chat line. Dropping beats misattributing.
                None => {
                    log::debug!("Clue reward shown without a resolved tier, dropping");
                    return None;
                }
            },
            RewardContainerKind::Kingdom => "Kingdom of Miscellania".to_string(),
            RewardContainerKind::FishingTrawler => "Fishing Trawler".to_string(),
        };

        let items: Vec<ItemStack> = contents.iter().filter(|s| s.id != 0).cloned().collect();
        if items.is_empty() {
            log::debug!("No items in reward container for event {}", event);
            return None;
        }

        Some(ResolvedLoot {
            event,
            kind: LootKind::Activity,
            combat_level: None,
            items,
        })
    }

    fn on_inventory_changed(
        &mut self,
        container: ContainerKind,
        contents: &[(u32, i32)],
    ) -> Option<ResolvedLoot> {
        self.pending.as_ref()?;
        if container != ContainerKind::PlayerInventory {
            return None;
        }

        let pending = self.pending.take()?;
        let snapshot = pending.snapshot?;
        let gains = snapshot.diff(contents);

        Some(ResolvedLoot {
            event: pending.event,
            kind: LootKind::Activity,
            combat_level: None,
            items: gains,
        })
    }

    fn at_last_man_standing(&self, view: &dyn GameView) -> bool {
        let loaded = view.map_regions();
        LAST_MAN_STANDING_REGIONS
            .iter()
            .any(|region| loaded.contains(region))
    }

    /// Whether a snapshot-deferred event is currently waiting.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker_core::signals::WorldContext;

    fn view(region: u32, inventory: Vec<(u32, i32)>) -> WorldContext {
        WorldContext {
            region_id: Some(region),
            map_regions: vec![region],
            inventory: Some(inventory),
        }
    }

    fn game_message(text: &str) -> Signal {
        Signal::ChatMessage {
            kind: ChatKind::GameMessage,
            text: text.to_string(),
        }
    }

    fn inventory_changed(contents: Vec<(u32, i32)>) -> Signal {
        Signal::InventoryChanged {
            container: ContainerKind::PlayerInventory,
            contents,
        }
    }

    #[test]
    fn test_brimstone_chest_resolved_by_snapshot_diff() {
        let mut correlator = EventCorrelator::new();

        let before = view(5179, vec![(995, 1000)]);
        assert!(correlator
            .handle(&game_message(CHEST_LOOTED_MESSAGE), &before)
            .is_none());
        assert!(correlator.has_pending());

        let after = view(5179, vec![(995, 2200), (1601, 1)]);
        let resolved = correlator
            .handle(&inventory_changed(vec![(995, 2200), (1601, 1)]), &after)
            .unwrap();

        assert_eq!(resolved.event, "Brimstone Chest");
        assert_eq!(resolved.kind, LootKind::Activity);
        assert_eq!(resolved.combat_level, None);
        assert_eq!(
            resolved.items,
            vec![ItemStack::new(995, 1200), ItemStack::new(1601, 1)]
        );
        assert!(!correlator.has_pending());
    }

    #[test]
    fn test_chest_message_in_unknown_region_is_ignored() {
        let mut correlator = EventCorrelator::new();

        let somewhere = view(9999, vec![(995, 1000)]);
        correlator.handle(&game_message(CHEST_LOOTED_MESSAGE), &somewhere);

        assert!(!correlator.has_pending());
    }

    #[test]
    fn test_larran_chest_message_matches_pattern() {
        let mut correlator = EventCorrelator::new();

        let larran = view(12093, vec![]);
        correlator.handle(
            &game_message("You have opened Larran's big chest 12 times."),
            &larran,
        );
        assert!(correlator.has_pending());

        let resolved = correlator
            .handle(&inventory_changed(vec![(562, 50)]), &larran)
            .unwrap();
        assert_eq!(resolved.event, "Larran's big chest");
    }

    #[test]
    fn test_herbiboar_trigger_is_region_independent() {
        let mut correlator = EventCorrelator::new();

        let anywhere = view(4242, vec![(199, 2)]);
        correlator.handle(&game_message(HERBIBOAR_LOOTED_MESSAGE), &anywhere);

        let resolved = correlator
            .handle(&inventory_changed(vec![(199, 5)]), &anywhere)
            .unwrap();
        assert_eq!(resolved.event, "Herbiboar");
        assert_eq!(resolved.items, vec![ItemStack::new(199, 3)]);
    }

    #[test]
    fn test_hespori_trigger_gated_by_region() {
        let mut correlator = EventCorrelator::new();

        let elsewhere = view(5020, vec![]);
        correlator.handle(&game_message(HESPORI_LOOTED_MESSAGE), &elsewhere);
        assert!(!correlator.has_pending());

        let hespori = view(HESPORI_REGION, vec![]);
        correlator.handle(&game_message(HESPORI_LOOTED_MESSAGE), &hespori);
        assert!(correlator.has_pending());
    }

    #[test]
    fn test_gauntlet_trigger_gated_by_lobby_region() {
        let mut correlator = EventCorrelator::new();

        let lobby = view(GAUNTLET_LOBBY_REGION, vec![(995, 0)]);
        correlator.handle(&game_message(GAUNTLET_LOOTED_MESSAGE), &lobby);

        let resolved = correlator
            .handle(&inventory_changed(vec![(23956, 1)]), &lobby)
            .unwrap();
        assert_eq!(resolved.event, "The Gauntlet");
    }

    #[test]
    fn test_non_game_chat_kinds_are_ignored() {
        let mut correlator = EventCorrelator::new();

        let chest = view(5179, vec![]);
        correlator.handle(
            &Signal::ChatMessage {
                kind: ChatKind::Other,
                text: CHEST_LOOTED_MESSAGE.to_string(),
            },
            &chest,
        );

        assert!(!correlator.has_pending());
    }

    #[test]
    fn test_npc_loot_resolves_immediately() {
        let mut correlator = EventCorrelator::new();

        let resolved = correlator
            .handle(
                &Signal::NpcLoot {
                    name: "King Black Dragon".to_string(),
                    combat_level: 276,
                    items: vec![ItemStack::new(536, 1)],
                },
                &WorldContext::default(),
            )
            .unwrap();

        assert_eq!(resolved.event, "King Black Dragon");
        assert_eq!(resolved.kind, LootKind::Npc);
        assert_eq!(resolved.combat_level, Some(276));
    }

    #[test]
    fn test_player_loot_suppressed_inside_lms() {
        let mut correlator = EventCorrelator::new();

        let lms = WorldContext {
            region_id: Some(13658),
            map_regions: vec![13658, 13659],
            inventory: Some(vec![]),
        };

        let suppressed = correlator.handle(
            &Signal::PlayerLoot {
                name: "SomePlayer".to_string(),
                combat_level: 126,
                items: vec![ItemStack::new(4151, 1)],
            },
            &lms,
        );
        assert!(suppressed.is_none());

        let wilderness = view(12345, vec![]);
        let resolved = correlator.handle(
            &Signal::PlayerLoot {
                name: "SomePlayer".to_string(),
                combat_level: 126,
                items: vec![ItemStack::new(4151, 1)],
            },
            &wilderness,
        );
        assert_eq!(resolved.unwrap().kind, LootKind::Player);
    }

    #[test]
    fn test_reward_latch_blocks_duplicate_until_loading() {
        let mut correlator = EventCorrelator::new();
        let cox = view(13136, vec![]);

        let reward = Signal::RewardContainer {
            kind: RewardContainerKind::ChambersOfXeric,
            contents: vec![ItemStack::new(565, 200)],
        };

        assert!(correlator.handle(&reward, &cox).is_some());
        assert!(correlator.handle(&reward, &cox).is_none());

        correlator.handle(
            &Signal::GameState {
                state: ClientState::Loading,
            },
            &cox,
        );

        assert!(correlator.handle(&reward, &cox).is_some());
    }

    #[test]
    fn test_theatre_reward_requires_region() {
        let mut correlator = EventCorrelator::new();

        let reward = Signal::RewardContainer {
            kind: RewardContainerKind::TheatreOfBlood,
            contents: vec![ItemStack::new(22486, 1)],
        };

        let outside = view(12866, vec![]);
        assert!(correlator.handle(&reward, &outside).is_none());

        let inside = view(THEATRE_OF_BLOOD_REGION, vec![]);
        let resolved = correlator.handle(&reward, &inside).unwrap();
        assert_eq!(resolved.event, "Theatre of Blood");
    }

    #[test]
    fn test_clue_tier_resolved_from_chat() {
        let mut correlator = EventCorrelator::new();
        let anywhere = WorldContext::default();

        correlator.handle(
            &game_message("You have completed 5 hard Treasure Trails."),
            &anywhere,
        );

        let resolved = correlator
            .handle(
                &Signal::RewardContainer {
                    kind: RewardContainerKind::ClueScroll,
                    contents: vec![ItemStack::new(11840, 3)],
                },
                &anywhere,
            )
            .unwrap();

        assert_eq!(resolved.event, "Clue Scroll (Hard)");
        assert_eq!(resolved.items, vec![ItemStack::new(11840, 3)]);
    }

    #[test]
    fn test_clue_reward_without_tier_is_dropped() {
        let mut correlator = EventCorrelator::new();

        let dropped = correlator.handle(
            &Signal::RewardContainer {
                kind: RewardContainerKind::ClueScroll,
                contents: vec![ItemStack::new(11840, 3)],
            },
            &WorldContext::default(),
        );

        assert!(dropped.is_none());
    }

    #[test]
    fn test_empty_reward_container_resolves_nothing() {
        let mut correlator = EventCorrelator::new();

        let empty = correlator.handle(
            &Signal::RewardContainer {
                kind: RewardContainerKind::Barrows,
                contents: vec![],
            },
            &WorldContext::default(),
        );

        assert!(empty.is_none());
    }

    #[test]
    fn test_stale_pending_overwritten_by_next_trigger() {
        let mut correlator = EventCorrelator::new();

        // Gauntlet chest opened, nothing ever looted.
        let lobby = view(GAUNTLET_LOBBY_REGION, vec![(995, 10)]);
        correlator.handle(&game_message(GAUNTLET_LOOTED_MESSAGE), &lobby);

        // A later brimstone trigger overwrites the stale pending event.
        let brimstone = view(5179, vec![(995, 10)]);
        correlator.handle(&game_message(CHEST_LOOTED_MESSAGE), &brimstone);

        let resolved = correlator
            .handle(&inventory_changed(vec![(995, 510)]), &brimstone)
            .unwrap();
        assert_eq!(resolved.event, "Brimstone Chest");
    }

    #[test]
    fn test_other_container_changes_do_not_resolve_pending() {
        let mut correlator = EventCorrelator::new();

        let chest = view(5179, vec![(995, 100)]);
        correlator.handle(&game_message(CHEST_LOOTED_MESSAGE), &chest);

        let bank_changed = Signal::InventoryChanged {
            container: ContainerKind::Other,
            contents: vec![(995, 99999)],
        };
        assert!(correlator.handle(&bank_changed, &chest).is_none());
        assert!(correlator.has_pending());
    }

    #[test]
    fn test_inventory_change_without_pending_is_ignored() {
        let mut correlator = EventCorrelator::new();

        let idle = correlator.handle(
            &inventory_changed(vec![(995, 100)]),
            &WorldContext::default(),
        );

        assert!(idle.is_none());
    }

    #[test]
    fn test_pending_without_snapshot_resolves_nothing() {
        let mut correlator = EventCorrelator::new();

        // Inventory not yet loaded at trigger time.
        let no_inventory = WorldContext {
            region_id: Some(5179),
            map_regions: vec![5179],
            inventory: None,
        };
        correlator.handle(&game_message(CHEST_LOOTED_MESSAGE), &no_inventory);
        assert!(correlator.has_pending());

        let resolved = correlator.handle(&inventory_changed(vec![(995, 100)]), &no_inventory);
        assert!(resolved.is_none());
        assert!(!correlator.has_pending());
    }
}
