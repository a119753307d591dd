use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

pub mod patch;

pub use patch::{CharacterPatch, NullableField, SavePatch};

// Character defaults applied when a create request omits a stat
pub const DEFAULT_LEVEL: i64 = 1;
pub const DEFAULT_EXP: i64 = 0;
pub const DEFAULT_EXP_TO_NEXT: i64 = 100;
pub const DEFAULT_HP: i64 = 50;
pub const DEFAULT_MAX_HP: i64 = 50;
pub const DEFAULT_ATTACK: i64 = 10;
pub const DEFAULT_DEFENSE: i64 = 5;
pub const DEFAULT_GOLD: i64 = 0;

// Save defaults for a fresh dungeon run
pub const DEFAULT_FLOOR: i64 = 1;
pub const DEFAULT_PLAYER_X: i64 = 1;
pub const DEFAULT_PLAYER_Y: i64 = 6;
pub const DEFAULT_POTIONS: i64 = 3;
pub const DEFAULT_KEYS: i64 = 0;

/// A player character, keyed by (`userId`, `id`) in the characters table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Character {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub id: String,
    pub name: String,
    pub level: i64,
    pub exp: i64,
    #[serde(rename = "expToNext")]
    pub exp_to_next: i64,
    pub hp: i64,
    #[serde(rename = "maxHp")]
    pub max_hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub gold: i64,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl Character {
    /// Builds a level one character with every stat at its default.
    pub fn new(user_id: &str, id: &str, name: &str, now: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            id: id.to_string(),
            name: name.to_string(),
            level: DEFAULT_LEVEL,
            exp: DEFAULT_EXP,
            exp_to_next: DEFAULT_EXP_TO_NEXT,
            hp: DEFAULT_HP,
            max_hp: DEFAULT_MAX_HP,
            attack: DEFAULT_ATTACK,
            defense: DEFAULT_DEFENSE,
            gold: DEFAULT_GOLD,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// Dungeon progress for one character, keyed by (`userId`, `characterId`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSave {
    pub user_id: String,
    pub character_id: String,
    pub id: String,
    /// Snapshot of the character as the client last saw it.
    pub character: Map<String, Value>,
    pub current_floor: i64,
    pub player_x: i64,
    pub player_y: i64,
    pub potions: i64,
    pub keys: i64,
    /// Keyed by `"<floor>-<x>-<y>"`.
    #[serde(default)]
    pub door_states: BTreeMap<String, bool>,
    #[serde(default)]
    pub chest_states: BTreeMap<String, bool>,
    /// Last known position per floor, keyed by floor number.
    #[serde(default = "default_player_positions")]
    pub player_positions: BTreeMap<String, Position>,
    #[serde(default)]
    pub messages: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl GameSave {
    /// Builds a save at the dungeon entrance for the given character snapshot.
    pub fn new(
        user_id: &str,
        character_id: &str,
        id: &str,
        character: Map<String, Value>,
        now: &str,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            character_id: character_id.to_string(),
            id: id.to_string(),
            character,
            current_floor: DEFAULT_FLOOR,
            player_x: DEFAULT_PLAYER_X,
            player_y: DEFAULT_PLAYER_Y,
            potions: DEFAULT_POTIONS,
            keys: DEFAULT_KEYS,
            door_states: BTreeMap::new(),
            chest_states: BTreeMap::new(),
            player_positions: default_player_positions(),
            messages: Vec::new(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

pub fn default_player_positions() -> BTreeMap<String, Position> {
    BTreeMap::from([
        ("1".to_string(), Position { x: 1, y: 6 }),
        ("2".to_string(), Position { x: 1, y: 1 }),
        ("3".to_string(), Position { x: 1, y: 1 }),
    ])
}

// Response DTOs for general use across services
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// Helper function to get current timestamp as string
pub fn now_str() -> String {
    format_timestamp(Utc::now())
}

/// Returns a timestamp strictly later than `previous`.
///
/// Normally this is just the current time; if the clock has not moved past
/// `previous` (same microsecond, or skew) the previous value is bumped by one
/// microsecond instead.
pub fn next_timestamp_after(previous: &str) -> String {
    let now = Utc::now();
    match DateTime::parse_from_rfc3339(previous) {
        Ok(prev) if prev.with_timezone(&Utc) >= now => {
            format_timestamp(prev.with_timezone(&Utc) + Duration::microseconds(1))
        }
        _ => format_timestamp(now),
    }
}

/// Converts decimal numbers coming out of the store into plain JSON numbers:
/// integral values become integers, everything else stays a float.
pub fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(normalize_number(n)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(normalize_object(map)),
        other => other,
    }
}

pub fn normalize_object(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| (key, normalize_numbers(value)))
        .collect()
}

fn normalize_number(n: Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n;
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Number::from(f as i64)
        }
        _ => n,
    }
}
