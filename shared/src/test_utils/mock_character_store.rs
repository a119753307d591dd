use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::models::Character;
use crate::store::CharacterStore;

use super::MockFailure;

/// MockCharacterStore is an in-memory implementation of CharacterStore for testing.
///
/// Records are ordered by (`userId`, `id`) like the table's composite key, so
/// listing walks a user's range backwards exactly as a descending query would.
/// `set_failure` makes every call fail, for exercising error responses.
#[derive(Default)]
pub struct MockCharacterStore {
    characters: Mutex<BTreeMap<(String, String), Character>>,
    failure: Mutex<Option<MockFailure>>,
}

impl MockCharacterStore {
    /// Create a new empty MockCharacterStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MockCharacterStore with initial test data
    pub fn with_data(characters: Vec<Character>) -> Self {
        let store = Self::new();
        {
            let mut map = store.characters.lock().unwrap();
            for character in characters {
                map.insert(
                    (character.user_id.clone(), character.id.clone()),
                    character,
                );
            }
        }
        store
    }

    pub fn set_failure(&self, failure: Option<MockFailure>) {
        *self.failure.lock().unwrap() = failure;
    }

    fn check(&self, operation: &str) -> Result<()> {
        match *self.failure.lock().unwrap() {
            Some(failure) => Err(failure.to_error(operation)),
            None => Ok(()),
        }
    }

    /// Number of stored characters across all users
    pub fn len(&self) -> usize {
        self.characters.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CharacterStore for MockCharacterStore {
    async fn create_character(&self, character: Character) -> Result<Character> {
        self.check("put_item")?;
        self.characters.lock().unwrap().insert(
            (character.user_id.clone(), character.id.clone()),
            character.clone(),
        );
        Ok(character)
    }

    async fn get_character(&self, user_id: &str, id: &str) -> Result<Character> {
        self.check("get_item")?;
        self.characters
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Character not found: {}", id)))
    }

    async fn get_characters_by_user(&self, user_id: &str) -> Result<Vec<Character>> {
        self.check("query")?;
        let characters = self.characters.lock().unwrap();

        Ok(characters
            .iter()
            .rev()
            .filter(|((owner, _), _)| owner == user_id)
            .map(|(_, character)| character.clone())
            .collect())
    }

    async fn update_character(&self, character: Character) -> Result<Character> {
        self.create_character(character).await
    }

    async fn delete_character(&self, user_id: &str, id: &str) -> Result<()> {
        self.check("delete_item")?;
        self.characters
            .lock()
            .unwrap()
            .remove(&(user_id.to_string(), id.to_string()));
        Ok(())
    }
}
