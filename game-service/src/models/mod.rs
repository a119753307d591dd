use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use dungeon_shared::models::{CharacterPatch, Position, SavePatch};

// Request DTOs
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    #[serde(default)]
    pub name: String,
    pub level: Option<i64>,
    pub exp: Option<i64>,
    pub exp_to_next: Option<i64>,
    pub hp: Option<i64>,
    pub max_hp: Option<i64>,
    pub attack: Option<i64>,
    pub defense: Option<i64>,
    pub gold: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaveRequest {
    #[serde(default)]
    pub character: Map<String, Value>,
    pub current_floor: Option<i64>,
    pub player_x: Option<i64>,
    pub player_y: Option<i64>,
    pub potions: Option<i64>,
    pub keys: Option<i64>,
    pub door_states: Option<BTreeMap<String, bool>>,
    pub chest_states: Option<BTreeMap<String, bool>>,
    pub player_positions: Option<BTreeMap<String, Position>>,
    pub messages: Option<Vec<String>>,
}

impl CreateSaveRequest {
    /// The snapshot's `id`, which keys the save.
    pub fn character_id(&self) -> Option<&str> {
        self.character
            .get("id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// A validated character update: which record, and what to change.
#[derive(Debug)]
pub struct CharacterUpdate {
    pub id: String,
    pub patch: CharacterPatch,
}

/// A validated save update. `id` is the save id the client holds.
#[derive(Debug)]
pub struct SaveUpdate {
    pub id: String,
    pub character_id: String,
    pub patch: SavePatch,
}
