use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};
use std::collections::HashMap;

use crate::error::{map_dynamo_error, Result, StoreError};
use crate::models::{normalize_object, Character, GameSave};

// Character Store Constants
pub const CHARACTERS_TABLE_NAME: &str = "characters";

// Save Store Constants
pub const GAME_SAVES_TABLE_NAME: &str = "game-saves";

type Item = HashMap<String, AttributeValue>;

fn key(partition: (&str, &str), sort: (&str, &str)) -> Item {
    HashMap::from([
        (partition.0.to_string(), AttributeValue::S(partition.1.to_string())),
        (sort.0.to_string(), AttributeValue::S(sort.1.to_string())),
    ])
}

// DynamoCharacterStore

/// DynamoDB store for characters (`userId` hash key, `id` range key)
pub struct DynamoCharacterStore {
    client: Client,
    table_name: String,
}

impl DynamoCharacterStore {
    /// Creates a new DynamoDB store with the specified client and table name.
    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    async fn put(&self, character: &Character) -> Result<()> {
        let item = to_item(character)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| map_dynamo_error("put_item", e))?;

        Ok(())
    }
}

#[async_trait]
impl super::CharacterStore for DynamoCharacterStore {
    async fn create_character(&self, character: Character) -> Result<Character> {
        self.put(&character).await?;
        Ok(character)
    }

    async fn get_character(&self, user_id: &str, id: &str) -> Result<Character> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key(("userId", user_id), ("id", id))))
            .send()
            .await
            .map_err(|e| map_dynamo_error("get_item", e))?;

        let item = response
            .item()
            .ok_or_else(|| StoreError::NotFound(format!("Character not found: {}", id)))?;

        Ok(from_item(item.clone())?)
    }

    /// Queries the user's partition in descending sort-key order. Character ids
    /// are time ordered, so this is newest first without re-sorting.
    async fn get_characters_by_user(&self, user_id: &str) -> Result<Vec<Character>> {
        let expr_attr_names = HashMap::from([("#user_id".to_string(), "userId".to_string())]);
        let expr_attr_values = HashMap::from([(
            ":user_id".to_string(),
            AttributeValue::S(user_id.to_string()),
        )]);

        let mut characters = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let response = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#user_id = :user_id")
                .set_expression_attribute_names(Some(expr_attr_names.clone()))
                .set_expression_attribute_values(Some(expr_attr_values.clone()))
                .scan_index_forward(false)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| map_dynamo_error("query", e))?;

            for item in response.items() {
                characters.push(from_item(item.clone())?);
            }

            match response.last_evaluated_key() {
                Some(last) if !last.is_empty() => start_key = Some(last.clone()),
                _ => break,
            }
        }

        Ok(characters)
    }

    async fn update_character(&self, character: Character) -> Result<Character> {
        // Whole-item replacement; the caller has already merged onto the stored record
        self.put(&character).await?;
        Ok(character)
    }

    async fn delete_character(&self, user_id: &str, id: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key(("userId", user_id), ("id", id))))
            .send()
            .await
            .map_err(|e| map_dynamo_error("delete_item", e))?;

        Ok(())
    }
}

// DynamoSaveStore

/// DynamoDB store for game saves (`userId` hash key, `characterId` range key)
pub struct DynamoSaveStore {
    client: Client,
    table_name: String,
}

impl DynamoSaveStore {
    /// Creates a new DynamoDB store with the specified client and table name.
    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    async fn put(&self, save: &GameSave) -> Result<()> {
        let item = to_item(save)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| map_dynamo_error("put_item", e))?;

        Ok(())
    }
}

// The character snapshot is free-form JSON, so its numbers come back as
// whatever the decimal string parses to
fn save_from_item(item: Item) -> Result<GameSave> {
    let mut save: GameSave = from_item(item)?;
    save.character = normalize_object(save.character);
    Ok(save)
}

#[async_trait]
impl super::SaveStore for DynamoSaveStore {
    async fn create_save(&self, save: GameSave) -> Result<GameSave> {
        self.put(&save).await?;
        Ok(save)
    }

    async fn get_save(&self, user_id: &str, character_id: &str) -> Result<GameSave> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key(("userId", user_id), ("characterId", character_id))))
            .send()
            .await
            .map_err(|e| map_dynamo_error("get_item", e))?;

        let item = response.item().ok_or_else(|| {
            StoreError::NotFound(format!("Save not found for character: {}", character_id))
        })?;

        save_from_item(item.clone())
    }

    /// Finds a save by its save id.
    ///
    /// The save id is not part of the table key, so this is a filtered scan
    /// over the whole table, paging until a match turns up.
    async fn find_save_by_id(&self, user_id: &str, save_id: &str) -> Result<GameSave> {
        let expr_attr_names = HashMap::from([
            ("#user_id".to_string(), "userId".to_string()),
            ("#id".to_string(), "id".to_string()),
        ]);
        let expr_attr_values = HashMap::from([
            (":user_id".to_string(), AttributeValue::S(user_id.to_string())),
            (":save_id".to_string(), AttributeValue::S(save_id.to_string())),
        ]);

        let mut start_key: Option<Item> = None;

        loop {
            let response = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("#user_id = :user_id AND #id = :save_id")
                .set_expression_attribute_names(Some(expr_attr_names.clone()))
                .set_expression_attribute_values(Some(expr_attr_values.clone()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| map_dynamo_error("scan", e))?;

            if let Some(item) = response.items().first() {
                return save_from_item(item.clone());
            }

            match response.last_evaluated_key() {
                Some(last) if !last.is_empty() => start_key = Some(last.clone()),
                _ => break,
            }
        }

        Err(StoreError::NotFound(format!("Save not found: {}", save_id)))
    }

    async fn update_save(&self, save: GameSave) -> Result<GameSave> {
        self.put(&save).await?;
        Ok(save)
    }

    async fn delete_save(&self, user_id: &str, character_id: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key(("userId", user_id), ("characterId", character_id))))
            .send()
            .await
            .map_err(|e| map_dynamo_error("delete_item", e))?;

        Ok(())
    }
}
