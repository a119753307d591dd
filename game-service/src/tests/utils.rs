use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use dungeon_shared::models::{Character, GameSave};
use dungeon_shared::store::dynamo::{DynamoCharacterStore, DynamoSaveStore};
use dungeon_shared::store::{CharacterStore, SaveStore};
use dungeon_shared::test_utils::dynamo_test_utils::{
    clear_dynamo_table, create_characters_table, create_dynamo_client, create_saves_table,
    use_dynamodb,
};
use dungeon_shared::test_utils::mock_character_store::MockCharacterStore;
use dungeon_shared::test_utils::mock_save_store::MockSaveStore;
use dungeon_shared::test_utils::test_logging::init_test_logging;

use crate::envelope::{GatewayRequest, GatewayResponse};
use crate::handlers::AppState;
use crate::routes;

// Constants for DynamoDB tests
const CHARACTERS_TEST_TABLE: &str = "characters-test-table";
const SAVES_TEST_TABLE: &str = "game-saves-test-table";

pub const SEED_TIME: &str = "2024-01-01T00:00:00.000000Z";

/// Builds API Gateway proxy events the way the REST API delivers them.
pub struct EventBuilder {
    request: GatewayRequest,
}

pub fn event(method: &str, resource: &str) -> EventBuilder {
    EventBuilder {
        request: GatewayRequest {
            http_method: method.to_string(),
            resource: Some(resource.to_string()),
            path: Some(resource.to_string()),
            ..GatewayRequest::default()
        },
    }
}

impl EventBuilder {
    pub fn path(mut self, path: &str) -> Self {
        self.request.path = Some(path.to_string());
        self
    }

    pub fn without_resource(mut self) -> Self {
        self.request.resource = None;
        self
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.request
            .path_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn json_body(self, body: Value) -> Self {
        self.raw_body(&body.to_string())
    }

    pub fn raw_body(mut self, body: &str) -> Self {
        self.request.body = Some(body.to_string());
        self
    }

    pub fn base64_body(mut self, encoded: &str) -> Self {
        self.request.body = Some(encoded.to_string());
        self.request.is_base64_encoded = Some(true);
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.request = self.request.with_subject(subject);
        self
    }

    pub fn build(self) -> Value {
        serde_json::to_value(self.request).unwrap()
    }
}

/// Dispatches `event` and returns the status and the parsed body.
pub async fn send(state: &AppState, event: Value) -> (u16, Value) {
    let response = routes::dispatch(state, event).await;
    (response.status_code, body_json(&response))
}

pub fn body_json(response: &GatewayResponse) -> Value {
    serde_json::from_str(&response.body).unwrap_or(Value::Null)
}

pub fn error_body(message: &str) -> Value {
    json!({ "error": message })
}

pub fn seed_characters() -> Vec<Character> {
    let mut knight = Character::new("user_1", "char_a", "Knight", SEED_TIME);
    knight.level = 3;
    knight.gold = 120;
    let mage = Character::new("user_1", "char_b", "Mage", SEED_TIME);
    let rogue = Character::new("user_2", "char_c", "Rogue", SEED_TIME);
    vec![knight, mage, rogue]
}

pub fn seed_saves() -> Vec<GameSave> {
    let snapshot = json!({ "id": "char_a", "name": "Knight", "level": 3 });
    let mut save = GameSave::new(
        "user_1",
        "char_a",
        "save_a",
        snapshot.as_object().unwrap().clone(),
        SEED_TIME,
    );
    save.messages = vec!["Knight entered the dungeon".to_string()];
    save.door_states.insert("1-3-4".to_string(), true);

    let other = json!({ "id": "char_c", "name": "Rogue" });
    let rogue_save = GameSave::new(
        "user_2",
        "char_c",
        "save_c",
        other.as_object().unwrap().clone(),
        SEED_TIME,
    );
    vec![save, rogue_save]
}

/// In-memory state with the seed data; the stores are returned for inspection.
pub fn mock_state() -> (AppState, Arc<MockCharacterStore>, Arc<MockSaveStore>) {
    init_test_logging();
    let characters = Arc::new(MockCharacterStore::with_data(seed_characters()));
    let saves = Arc::new(MockSaveStore::with_data(seed_saves()));
    let state = AppState::new(characters.clone(), saves.clone());
    (state, characters, saves)
}

/// Seeded state backed by DynamoDB Local when `USE_DYNAMODB=true`, the mock
/// stores otherwise.
pub async fn create_test_state() -> AppState {
    init_test_logging();
    if !use_dynamodb() {
        return mock_state().0;
    }

    log::info!("Using DynamoDB for tests");
    let client = create_dynamo_client().await;
    if let Err(e) = create_characters_table(&client, CHARACTERS_TEST_TABLE).await {
        log::error!("Error setting up characters table: {}", e);
    }
    if let Err(e) = create_saves_table(&client, SAVES_TEST_TABLE).await {
        log::error!("Error setting up saves table: {}", e);
    }
    clear_dynamo_table(&client, CHARACTERS_TEST_TABLE, "userId", "id").await;
    clear_dynamo_table(&client, SAVES_TEST_TABLE, "userId", "characterId").await;

    let characters = Arc::new(DynamoCharacterStore::with_client_and_table(
        client.clone(),
        CHARACTERS_TEST_TABLE.to_string(),
    ));
    let saves = Arc::new(DynamoSaveStore::with_client_and_table(
        client,
        SAVES_TEST_TABLE.to_string(),
    ));

    for character in seed_characters() {
        if let Err(e) = characters.create_character(character).await {
            log::error!("Failed to seed character: {}", e);
        }
    }
    for save in seed_saves() {
        if let Err(e) = saves.create_save(save).await {
            log::error!("Failed to seed save: {}", e);
        }
    }

    AppState::new(characters, saves)
}
