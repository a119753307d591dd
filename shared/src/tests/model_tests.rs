use crate::error::StoreError;
use crate::models::{
    default_player_positions, next_timestamp_after, normalize_numbers, Character, CharacterPatch,
    GameSave, NullableField, Position, SavePatch,
};
use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{json, Value};
use std::collections::HashMap;

const EARLIER: &str = "2024-01-01T00:00:00.000000Z";

fn stored_character() -> Character {
    Character::new("user_1", "char_1", "Hero", EARLIER)
}

fn stored_save() -> GameSave {
    let snapshot = json!({ "id": "char_1", "name": "Hero", "level": 3 });
    GameSave::new(
        "user_1",
        "char_1",
        "save_1",
        snapshot.as_object().unwrap().clone(),
        EARLIER,
    )
}

#[test]
fn test_character_serializes_with_camel_case_keys() {
    let value = serde_json::to_value(stored_character()).unwrap();

    assert_eq!(value["userId"], "user_1");
    assert_eq!(value["expToNext"], 100);
    assert_eq!(value["maxHp"], 50);
    assert_eq!(value["createdAt"], EARLIER);
    assert!(value.get("user_id").is_none());
}

#[test]
fn test_nullable_field_distinguishes_absent_null_and_value() {
    let patch: CharacterPatch = serde_json::from_value(json!({ "level": 4, "gold": null })).unwrap();

    assert_eq!(patch.level, NullableField::Value(4));
    assert_eq!(patch.gold, NullableField::Null);
    assert_eq!(patch.hp, NullableField::NotPresent);
    assert!(!patch.name.was_present());
}

#[test]
fn test_character_patch_rejects_wrong_types() {
    let result = serde_json::from_value::<CharacterPatch>(json!({ "level": "high" }));
    assert!(result.is_err());
}

#[test]
fn test_character_merge_overwrites_present_fields_only() {
    let patch: CharacterPatch =
        serde_json::from_value(json!({ "level": 2, "exp": 15, "name": "  Knight " })).unwrap();

    let merged = stored_character().merged(patch).unwrap();

    assert_eq!(merged.level, 2);
    assert_eq!(merged.exp, 15);
    assert_eq!(merged.name, "Knight");
    assert_eq!(merged.hp, 50);
    assert_eq!(merged.id, "char_1");
    assert_eq!(merged.user_id, "user_1");
    assert_eq!(merged.created_at, EARLIER);
    assert!(merged.updated_at.as_str() > EARLIER);
}

#[test]
fn test_character_merge_ignores_identity_fields() {
    let patch: CharacterPatch = serde_json::from_value(json!({
        "id": "hijacked",
        "userId": "someone_else",
        "createdAt": "1999-01-01T00:00:00Z",
        "hp": 40
    }))
    .unwrap();

    let merged = stored_character().merged(patch).unwrap();

    assert_eq!(merged.id, "char_1");
    assert_eq!(merged.user_id, "user_1");
    assert_eq!(merged.created_at, EARLIER);
    assert_eq!(merged.hp, 40);
}

#[test]
fn test_character_merge_rejects_null_and_blank_name() {
    let null_level: CharacterPatch = serde_json::from_value(json!({ "level": null })).unwrap();
    assert!(matches!(
        stored_character().merged(null_level),
        Err(StoreError::ValidationError(_))
    ));

    let blank_name: CharacterPatch = serde_json::from_value(json!({ "name": "   " })).unwrap();
    assert!(matches!(
        stored_character().merged(blank_name),
        Err(StoreError::ValidationError(_))
    ));
}

#[test]
fn test_save_merge_clears_collections_on_null() {
    let mut save = stored_save();
    save.messages = vec!["Hero entered the dungeon".to_string()];
    save.door_states.insert("1-3-4".to_string(), true);

    let patch: SavePatch = serde_json::from_value(json!({
        "messages": null,
        "doorStates": null,
        "chestStates": { "2-5-5": true },
        "currentFloor": 2,
        "playerPositions": { "2": { "x": 4, "y": 2 } }
    }))
    .unwrap();

    let merged = save.merged(patch).unwrap();

    assert!(merged.messages.is_empty());
    assert!(merged.door_states.is_empty());
    assert_eq!(merged.chest_states.get("2-5-5"), Some(&true));
    assert_eq!(merged.current_floor, 2);
    assert_eq!(
        merged.player_positions.get("2"),
        Some(&Position { x: 4, y: 2 })
    );
    assert_eq!(merged.id, "save_1");
    assert_eq!(merged.character_id, "char_1");
}

#[test]
fn test_save_merge_rejects_null_character_snapshot() {
    let patch: SavePatch = serde_json::from_value(json!({ "character": null })).unwrap();
    assert!(matches!(
        stored_save().merged(patch),
        Err(StoreError::ValidationError(_))
    ));
}

#[test]
fn test_new_save_uses_entrance_defaults() {
    let save = stored_save();

    assert_eq!(save.current_floor, 1);
    assert_eq!(save.player_x, 1);
    assert_eq!(save.player_y, 6);
    assert_eq!(save.potions, 3);
    assert_eq!(save.keys, 0);
    assert_eq!(save.player_positions, default_player_positions());
    assert_eq!(save.created_at, save.updated_at);
}

#[test]
fn test_next_timestamp_after_is_strictly_later() {
    let future = "2999-12-31T23:59:59.999999Z";

    assert_eq!(next_timestamp_after(future), "3000-01-01T00:00:00.000000Z");
    assert!(next_timestamp_after(EARLIER).as_str() > EARLIER);
}

#[test]
fn test_normalize_numbers_turns_integral_floats_into_integers() {
    let value = json!({ "level": 3.0, "ratio": 0.5, "nested": [1.0, { "gold": 120.0 }], "name": "Hero" });

    let normalized = normalize_numbers(value);

    assert_eq!(normalized["level"], Value::from(3));
    assert!(normalized["level"].is_i64());
    assert_eq!(normalized["ratio"], Value::from(0.5));
    assert!(normalized["nested"][0].is_i64());
    assert!(normalized["nested"][1]["gold"].is_i64());
    assert_eq!(normalized["name"], "Hero");
}

#[test]
fn test_unreadable_item_is_a_serialization_error() {
    let item = HashMap::from([(
        "userId".to_string(),
        AttributeValue::S("user_1".to_string()),
    )]);

    let err: StoreError = serde_dynamo::from_item::<_, Character>(item)
        .unwrap_err()
        .into();

    assert!(matches!(err, StoreError::SerializationError(_)));
}
