use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Character, GameSave};

// Expose the DynamoDB store module
pub mod dynamo;

/// CharacterStore trait defining the interface for character storage implementations.
///
/// Every key includes the owner's subject id, so one user can never address
/// another user's records.
#[async_trait]
pub trait CharacterStore: Send + Sync + 'static {
    /// Writes a new character
    async fn create_character(&self, character: Character) -> Result<Character>;

    /// Gets a character by owner and id, `NotFound` if absent
    async fn get_character(&self, user_id: &str, id: &str) -> Result<Character>;

    /// Gets all characters owned by a user, newest first
    async fn get_characters_by_user(&self, user_id: &str) -> Result<Vec<Character>>;

    /// Replaces a stored character
    async fn update_character(&self, character: Character) -> Result<Character>;

    /// Deletes a character
    async fn delete_character(&self, user_id: &str, id: &str) -> Result<()>;
}

/// SaveStore trait defining the interface for game save storage implementations.
///
/// Saves are keyed by (`user_id`, `character_id`); the save id is only a
/// secondary identifier.
#[async_trait]
pub trait SaveStore: Send + Sync + 'static {
    /// Writes a save, replacing any existing save for the same character
    async fn create_save(&self, save: GameSave) -> Result<GameSave>;

    /// Gets the save for a character, `NotFound` if absent
    async fn get_save(&self, user_id: &str, character_id: &str) -> Result<GameSave>;

    /// Finds a save by its save id, `NotFound` if absent
    async fn find_save_by_id(&self, user_id: &str, save_id: &str) -> Result<GameSave>;

    /// Replaces a stored save
    async fn update_save(&self, save: GameSave) -> Result<GameSave>;

    /// Deletes the save for a character
    async fn delete_save(&self, user_id: &str, character_id: &str) -> Result<()>;
}
