//! Payload checks run before any store access. Each validator either returns a
//! typed request or an `InvalidPayload` error carrying the client-facing message.

use serde::de::DeserializeOwned;
use serde_json::Value;

use dungeon_shared::models::{CharacterPatch, SavePatch};

use crate::error::{
    AppError, Result, CHARACTER_REQUIRED, INVALID_FIELDS, INVALID_JSON, NAME_REQUIRED,
    SAVE_KEYS_REQUIRED,
};
use crate::models::{CharacterUpdate, CreateCharacterRequest, CreateSaveRequest, SaveUpdate};

fn typed<T: DeserializeOwned>(payload: Value) -> Result<T> {
    if !payload.is_object() {
        tracing::warn!("Payload is not a JSON object");
        return Err(AppError::InvalidPayload(INVALID_JSON.to_string()));
    }
    serde_json::from_value(payload).map_err(|err| {
        tracing::warn!("Payload field has the wrong type: {}", err);
        AppError::InvalidPayload(format!("{}: {}", INVALID_FIELDS, err))
    })
}

fn non_empty_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub fn character_create(payload: Value) -> Result<CreateCharacterRequest> {
    let name = non_empty_str(&payload, "name")
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidPayload(NAME_REQUIRED.to_string()))?;

    let mut request: CreateCharacterRequest = typed(payload)?;
    request.name = name;
    Ok(request)
}

pub fn character_update(id: String, payload: Value) -> Result<CharacterUpdate> {
    let patch: CharacterPatch = typed(payload)?;
    Ok(CharacterUpdate { id, patch })
}

pub fn save_create(payload: Value) -> Result<CreateSaveRequest> {
    let has_snapshot = matches!(payload.get("character"), Some(Value::Object(snapshot)) if !snapshot.is_empty());
    if !has_snapshot {
        return Err(AppError::InvalidPayload(CHARACTER_REQUIRED.to_string()));
    }

    let request: CreateSaveRequest = typed(payload)?;
    if request.character_id().is_none() {
        return Err(AppError::InvalidPayload(CHARACTER_REQUIRED.to_string()));
    }
    Ok(request)
}

pub fn save_update(payload: Value) -> Result<SaveUpdate> {
    let (Some(id), Some(character_id)) = (
        non_empty_str(&payload, "id").map(str::to_string),
        non_empty_str(&payload, "characterId").map(str::to_string),
    ) else {
        return Err(AppError::InvalidPayload(SAVE_KEYS_REQUIRED.to_string()));
    };

    let patch: SavePatch = typed(payload)?;
    Ok(SaveUpdate {
        id,
        character_id,
        patch,
    })
}
