//! Inbound signal model
//!
//! Everything the correlator consumes arrives as a `Signal` variant, in
//! arrival order, one at a time. That ordering is a hard precondition: the
//! state machine assumes the trigger text or reward container for one
//! logical event arrives before the matching inventory change. Hosts that
//! cannot guarantee in-order delivery must sequence signals before handing
//! them to the correlator.
//!
//! World context (current region, loaded map regions, inventory contents) is
//! not part of the signal payload; the correlator queries it through
//! [`GameView`] at signal-arrival time and never caches it across signals.

use serde::{Deserialize, Serialize};

use super::types::ItemStack;

/// Reward container surfaces the environment can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardContainerKind {
    Barrows,
    ChambersOfXeric,
    TheatreOfBlood,
    /// Shares its raw container with Barrows; the tier comes from chat.
    ClueScroll,
    Kingdom,
    FishingTrawler,
}

/// Which container an inventory-change signal refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    PlayerInventory,
    Other,
}

/// Chat line category. Only game messages and spam lines carry loot
/// triggers; everything else is discarded unread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    GameMessage,
    Spam,
    Other,
}

/// Coarse client state. Loading marks an area transition and resets the
/// per-instance reward latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientState {
    Loading,
    LoggedIn,
    LoginScreen,
}

/// One inbound notification from the host environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Explicit loot from an NPC kill, contents included.
    NpcLoot {
        name: String,
        combat_level: u16,
        items: Vec<ItemStack>,
    },
    /// Explicit loot from a player kill, contents included.
    PlayerLoot {
        name: String,
        combat_level: u16,
        items: Vec<ItemStack>,
    },
    /// A reward container surface was shown, contents included.
    RewardContainer {
        kind: RewardContainerKind,
        contents: Vec<ItemStack>,
    },
    /// Full contents of a container after a change.
    InventoryChanged {
        container: ContainerKind,
        contents: Vec<(u32, i32)>,
    },
    ChatMessage { kind: ChatKind, text: String },
    GameState { state: ClientState },
}

/// Read-only view of the game world, queried at signal-arrival time.
pub trait GameView {
    /// Region id of the player's current world location, if known.
    fn region_id(&self) -> Option<u32>;

    /// All map regions currently loaded by the client.
    fn map_regions(&self) -> Vec<u32>;

    /// Current player inventory contents, `None` while not yet loaded.
    fn inventory_contents(&self) -> Option<Vec<(u32, i32)>>;
}

/// Concrete world context attached to each signal by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldContext {
    #[serde(default)]
    pub region_id: Option<u32>,
    #[serde(default)]
    pub map_regions: Vec<u32>,
    #[serde(default)]
    pub inventory: Option<Vec<(u32, i32)>>,
}

impl GameView for WorldContext {
    fn region_id(&self) -> Option<u32> {
        self.region_id
    }

    fn map_regions(&self) -> Vec<u32> {
        self.map_regions.clone()
    }

    fn inventory_contents(&self) -> Option<Vec<(u32, i32)>> {
        self.inventory.clone()
    }
}

/// A signal paired with the world context it arrived in. This is the wire
/// format the runtime ingests (one JSON object per line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEnvelope {
    #[serde(default)]
    pub context: WorldContext,
    #[serde(flatten)]
    pub signal: Signal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_envelope_roundtrip() {
        let envelope = SignalEnvelope {
            context: WorldContext {
                region_id: Some(5179),
                map_regions: vec![5179],
                inventory: Some(vec![(995, 100)]),
            },
            signal: Signal::ChatMessage {
                kind: ChatKind::GameMessage,
                text: "You find some treasure in the chest!".to_string(),
            },
        };

        let json = serde_json::to_string(&envelope).unwrap();
        let back: SignalEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn test_envelope_context_defaults_when_missing() {
        let json = r#"{"type":"game_state","state":"loading"}"#;
        let envelope: SignalEnvelope = serde_json::from_str(json).unwrap();

        assert_eq!(
            envelope.signal,
            Signal::GameState {
                state: ClientState::Loading
            }
        );
        assert_eq!(envelope.context.region_id, None);
        assert!(envelope.context.map_regions.is_empty());
        assert!(envelope.context.inventory.is_none());
    }

    #[test]
    fn test_reward_container_signal_parses() {
        let json = r#"{
            "context": {"region_id": 12867},
            "type": "reward_container",
            "kind": "theatre_of_blood",
            "contents": [{"id": 11840, "quantity": 1}]
        }"#;
        let envelope: SignalEnvelope = serde_json::from_str(json).unwrap();

        match envelope.signal {
            Signal::RewardContainer { kind, contents } => {
                assert_eq!(kind, RewardContainerKind::TheatreOfBlood);
                assert_eq!(contents, vec![ItemStack::new(11840, 1)]);
            }
            other => panic!("unexpected signal: {:?}", other),
        }
    }
}
