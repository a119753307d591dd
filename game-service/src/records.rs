//! Record operations, each scoped to the caller's subject id.

use uuid::Uuid;

use dungeon_shared::error::StoreError;
use dungeon_shared::models::{normalize_object, now_str, Character, GameSave};
use dungeon_shared::store::{CharacterStore, SaveStore};

use crate::error::{
    AppError, Result, CHARACTER_NOT_FOUND, CHARACTER_REQUIRED, CREATE_CHARACTER_FAILED,
    CREATE_SAVE_FAILED, DELETE_CHARACTER_FAILED, DELETE_SAVE_FAILED, GET_SAVE_FAILED,
    LIST_CHARACTERS_FAILED, SAVE_NOT_FOUND, UPDATE_CHARACTER_FAILED, UPDATE_SAVE_FAILED,
};
use crate::models::{CharacterUpdate, CreateCharacterRequest, CreateSaveRequest, SaveUpdate};

// Records that fail conversion surface with the operation's failure message
fn failed(failure: &'static str) -> impl Fn(StoreError) -> AppError {
    move |err| match err {
        StoreError::SerializationError(detail) => {
            tracing::error!("{}: {}", failure, detail);
            AppError::Unexpected(failure.to_string())
        }
        other => AppError::from(other),
    }
}

// Store misses surface with the client-facing message for the record kind
fn missing(message: &'static str, failure: &'static str) -> impl Fn(StoreError) -> AppError {
    let fallback = failed(failure);
    move |err| match err {
        StoreError::NotFound(detail) => {
            tracing::debug!("{}", detail);
            AppError::NotFound(message.to_string())
        }
        other => fallback(other),
    }
}

pub async fn create_character(
    store: &dyn CharacterStore,
    subject: &str,
    request: CreateCharacterRequest,
) -> Result<Character> {
    // v7 ids sort by creation time, which the descending list query relies on
    let id = Uuid::now_v7().to_string();
    let mut character = Character::new(subject, &id, &request.name, &now_str());

    if let Some(level) = request.level {
        character.level = level;
    }
    if let Some(exp) = request.exp {
        character.exp = exp;
    }
    if let Some(exp_to_next) = request.exp_to_next {
        character.exp_to_next = exp_to_next;
    }
    if let Some(hp) = request.hp {
        character.hp = hp;
    }
    if let Some(max_hp) = request.max_hp {
        character.max_hp = max_hp;
    }
    if let Some(attack) = request.attack {
        character.attack = attack;
    }
    if let Some(defense) = request.defense {
        character.defense = defense;
    }
    if let Some(gold) = request.gold {
        character.gold = gold;
    }

    tracing::info!("Creating character {} for user {}", character.id, subject);
    store
        .create_character(character)
        .await
        .map_err(failed(CREATE_CHARACTER_FAILED))
}

pub async fn list_characters(store: &dyn CharacterStore, subject: &str) -> Result<Vec<Character>> {
    let characters = store
        .get_characters_by_user(subject)
        .await
        .map_err(failed(LIST_CHARACTERS_FAILED))?;
    tracing::debug!("Found {} characters for user {}", characters.len(), subject);
    Ok(characters)
}

pub async fn update_character(
    store: &dyn CharacterStore,
    subject: &str,
    update: CharacterUpdate,
) -> Result<Character> {
    let existing = store
        .get_character(subject, &update.id)
        .await
        .map_err(missing(CHARACTER_NOT_FOUND, UPDATE_CHARACTER_FAILED))?;

    let merged = existing.merged(update.patch)?;
    tracing::info!("Updating character {} for user {}", merged.id, subject);
    store
        .update_character(merged)
        .await
        .map_err(failed(UPDATE_CHARACTER_FAILED))
}

/// Deletes the character, then makes a best-effort attempt at its save.
pub async fn delete_character(
    characters: &dyn CharacterStore,
    saves: &dyn SaveStore,
    subject: &str,
    id: &str,
) -> Result<()> {
    characters
        .get_character(subject, id)
        .await
        .map_err(missing(CHARACTER_NOT_FOUND, DELETE_CHARACTER_FAILED))?;

    characters
        .delete_character(subject, id)
        .await
        .map_err(failed(DELETE_CHARACTER_FAILED))?;
    tracing::info!("Deleted character {} for user {}", id, subject);

    if let Err(err) = saves.delete_save(subject, id).await {
        tracing::warn!(
            "Failed to delete save for character {} (user {}): {}",
            id,
            subject,
            err
        );
    }
    Ok(())
}

pub async fn create_save(
    store: &dyn SaveStore,
    subject: &str,
    request: CreateSaveRequest,
) -> Result<GameSave> {
    let character_id = request
        .character_id()
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidPayload(CHARACTER_REQUIRED.to_string()))?;

    let snapshot = normalize_object(request.character);
    let mut save = GameSave::new(
        subject,
        &character_id,
        &Uuid::new_v4().to_string(),
        snapshot,
        &now_str(),
    );

    if let Some(floor) = request.current_floor {
        save.current_floor = floor;
    }
    if let Some(x) = request.player_x {
        save.player_x = x;
    }
    if let Some(y) = request.player_y {
        save.player_y = y;
    }
    if let Some(potions) = request.potions {
        save.potions = potions;
    }
    if let Some(keys) = request.keys {
        save.keys = keys;
    }
    if let Some(doors) = request.door_states {
        save.door_states = doors;
    }
    if let Some(chests) = request.chest_states {
        save.chest_states = chests;
    }
    if let Some(positions) = request.player_positions {
        save.player_positions = positions;
    }
    if let Some(messages) = request.messages {
        save.messages = messages;
    }

    tracing::info!(
        "Creating save {} for character {} (user {})",
        save.id,
        character_id,
        subject
    );
    store
        .create_save(save)
        .await
        .map_err(failed(CREATE_SAVE_FAILED))
}

pub async fn get_save(store: &dyn SaveStore, subject: &str, character_id: &str) -> Result<GameSave> {
    store
        .get_save(subject, character_id)
        .await
        .map_err(missing(SAVE_NOT_FOUND, GET_SAVE_FAILED))
}

pub async fn update_save(store: &dyn SaveStore, subject: &str, update: SaveUpdate) -> Result<GameSave> {
    let existing = store
        .get_save(subject, &update.character_id)
        .await
        .map_err(missing(SAVE_NOT_FOUND, UPDATE_SAVE_FAILED))?;
    if existing.id != update.id {
        tracing::warn!(
            "Save id {} in payload does not match stored save {} for character {}",
            update.id,
            existing.id,
            update.character_id
        );
    }

    let mut merged = existing.merged(update.patch)?;
    merged.character = normalize_object(merged.character);
    tracing::info!(
        "Updating save {} for character {} (user {})",
        merged.id,
        merged.character_id,
        subject
    );
    store
        .update_save(merged)
        .await
        .map_err(failed(UPDATE_SAVE_FAILED))
}

pub async fn delete_save(store: &dyn SaveStore, subject: &str, save_id: &str) -> Result<()> {
    let existing = store
        .find_save_by_id(subject, save_id)
        .await
        .map_err(missing(SAVE_NOT_FOUND, DELETE_SAVE_FAILED))?;

    store
        .delete_save(subject, &existing.character_id)
        .await
        .map_err(failed(DELETE_SAVE_FAILED))?;
    tracing::info!(
        "Deleted save {} for character {} (user {})",
        save_id,
        existing.character_id,
        subject
    );
    Ok(())
}

