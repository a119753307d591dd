//! Partial updates for stored records.
//!
//! A patch lists exactly the fields a client may change. Identity fields
//! (`userId`, `id`, `characterId`, `createdAt`) have no patch counterpart, so
//! merging can never move a record to another owner or key.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{next_timestamp_after, Character, GameSave, Position};
use crate::error::{Result, StoreError};

// Helper for null vs. not-present in JSON
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NullableField<T> {
    #[default]
    NotPresent,
    Null,
    Value(T),
}

impl<'de, T> Deserialize<'de> for NullableField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; absent keys fall back to Default
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => NullableField::Value(value),
            None => NullableField::Null,
        })
    }
}

impl<T> NullableField<T> {
    pub fn was_present(&self) -> bool {
        !matches!(self, NullableField::NotPresent)
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterPatch {
    pub name: NullableField<String>,
    pub level: NullableField<i64>,
    pub exp: NullableField<i64>,
    pub exp_to_next: NullableField<i64>,
    pub hp: NullableField<i64>,
    pub max_hp: NullableField<i64>,
    pub attack: NullableField<i64>,
    pub defense: NullableField<i64>,
    pub gold: NullableField<i64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SavePatch {
    pub character: NullableField<Map<String, Value>>,
    pub current_floor: NullableField<i64>,
    pub player_x: NullableField<i64>,
    pub player_y: NullableField<i64>,
    pub potions: NullableField<i64>,
    pub keys: NullableField<i64>,
    pub door_states: NullableField<BTreeMap<String, bool>>,
    pub chest_states: NullableField<BTreeMap<String, bool>>,
    pub player_positions: NullableField<BTreeMap<String, Position>>,
    pub messages: NullableField<Vec<String>>,
}

// Fields that a typed record cannot represent as null
fn merge_required<T>(target: &mut T, field: NullableField<T>, name: &str) -> Result<()> {
    match field {
        NullableField::NotPresent => Ok(()),
        NullableField::Null => Err(StoreError::ValidationError(format!(
            "{}にnullは指定できません",
            name
        ))),
        NullableField::Value(value) => {
            *target = value;
            Ok(())
        }
    }
}

// Collections: null clears them
fn merge_clearable<T: Default>(target: &mut T, field: NullableField<T>) {
    match field {
        NullableField::NotPresent => {}
        NullableField::Null => *target = T::default(),
        NullableField::Value(value) => *target = value,
    }
}

impl Character {
    /// Applies `patch` over this record and refreshes `updatedAt`.
    pub fn merged(mut self, patch: CharacterPatch) -> Result<Self> {
        if let NullableField::Value(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(StoreError::ValidationError(
                    "キャラクター名は必須です".to_string(),
                ));
            }
        }
        let name = match patch.name {
            NullableField::Value(name) => NullableField::Value(name.trim().to_string()),
            other => other,
        };

        merge_required(&mut self.name, name, "name")?;
        merge_required(&mut self.level, patch.level, "level")?;
        merge_required(&mut self.exp, patch.exp, "exp")?;
        merge_required(&mut self.exp_to_next, patch.exp_to_next, "expToNext")?;
        merge_required(&mut self.hp, patch.hp, "hp")?;
        merge_required(&mut self.max_hp, patch.max_hp, "maxHp")?;
        merge_required(&mut self.attack, patch.attack, "attack")?;
        merge_required(&mut self.defense, patch.defense, "defense")?;
        merge_required(&mut self.gold, patch.gold, "gold")?;

        self.updated_at = next_timestamp_after(&self.updated_at);
        Ok(self)
    }
}

impl GameSave {
    /// Applies `patch` over this save and refreshes `updatedAt`.
    pub fn merged(mut self, patch: SavePatch) -> Result<Self> {
        merge_required(&mut self.character, patch.character, "character")?;
        merge_required(&mut self.current_floor, patch.current_floor, "currentFloor")?;
        merge_required(&mut self.player_x, patch.player_x, "playerX")?;
        merge_required(&mut self.player_y, patch.player_y, "playerY")?;
        merge_required(&mut self.potions, patch.potions, "potions")?;
        merge_required(&mut self.keys, patch.keys, "keys")?;
        merge_clearable(&mut self.door_states, patch.door_states);
        merge_clearable(&mut self.chest_states, patch.chest_states);
        merge_clearable(&mut self.player_positions, patch.player_positions);
        merge_clearable(&mut self.messages, patch.messages);

        self.updated_at = next_timestamp_after(&self.updated_at);
        Ok(self)
    }
}
