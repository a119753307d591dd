use serde::Serialize;
use std::sync::Arc;

use dungeon_shared::store::{CharacterStore, SaveStore};

use crate::envelope::{GatewayRequest, GatewayResponse};
use crate::error::Result;
use crate::routes::Operation;

pub mod character_handlers;
pub mod save_handlers;

/// Stores shared by every invocation of a warm function instance.
#[derive(Clone)]
pub struct AppState {
    pub characters: Arc<dyn CharacterStore>,
    pub saves: Arc<dyn SaveStore>,
    /// Set when the function is deployed to serve a single operation.
    pub pinned: Option<Operation>,
}

impl AppState {
    pub fn new(characters: Arc<dyn CharacterStore>, saves: Arc<dyn SaveStore>) -> Self {
        Self {
            characters,
            saves,
            pinned: None,
        }
    }

    pub fn pinned_to(mut self, operation: Option<Operation>) -> Self {
        self.pinned = operation;
        self
    }
}

/// Serializes a handler outcome; errors become `{"error": ..}` bodies.
pub(crate) fn respond<T: Serialize>(result: Result<T>) -> GatewayResponse {
    match result {
        Ok(body) => GatewayResponse::ok(&body),
        Err(err) => err.into_response(),
    }
}

/// Runs the handler for `operation`.
pub async fn invoke(operation: Operation, state: &AppState, request: &GatewayRequest) -> GatewayResponse {
    tracing::debug!("Invoking {} handler", operation);
    match operation {
        Operation::ListCharacters => character_handlers::list_characters(state, request).await,
        Operation::CreateCharacter => character_handlers::create_character(state, request).await,
        Operation::UpdateCharacter => character_handlers::update_character(state, request).await,
        Operation::DeleteCharacter => character_handlers::delete_character(state, request).await,
        Operation::CreateSave => save_handlers::create_save(state, request).await,
        Operation::GetSave => save_handlers::get_save(state, request).await,
        Operation::UpdateSave => save_handlers::update_save(state, request).await,
        Operation::DeleteSave => save_handlers::delete_save(state, request).await,
    }
}
