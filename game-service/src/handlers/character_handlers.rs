use http::Method;

use dungeon_shared::models::{Character, MessageResponse};

use crate::envelope::{BodyRequirement, Envelope, GatewayRequest, GatewayResponse};
use crate::error::{Result, CHARACTER_ID_REQUIRED};
use crate::handlers::{respond, AppState};
use crate::{records, validators};

// GET /characters
pub async fn list_characters(state: &AppState, request: &GatewayRequest) -> GatewayResponse {
    if request.is_preflight() {
        return GatewayResponse::preflight();
    }
    respond(list(state, request).await)
}

async fn list(state: &AppState, request: &GatewayRequest) -> Result<Vec<Character>> {
    request.require_method(Method::GET)?;
    let envelope = Envelope::parse(request, BodyRequirement::Ignored)?;
    records::list_characters(state.characters.as_ref(), &envelope.subject).await
}

// POST /characters
pub async fn create_character(state: &AppState, request: &GatewayRequest) -> GatewayResponse {
    if request.is_preflight() {
        return GatewayResponse::preflight();
    }
    respond(create(state, request).await)
}

async fn create(state: &AppState, request: &GatewayRequest) -> Result<Character> {
    request.require_method(Method::POST)?;
    let (subject, payload) = Envelope::parse(request, BodyRequirement::Required)?.into_payload()?;
    let create = validators::character_create(payload)?;
    records::create_character(state.characters.as_ref(), &subject, create).await
}

// PUT /characters/{id}
pub async fn update_character(state: &AppState, request: &GatewayRequest) -> GatewayResponse {
    if request.is_preflight() {
        return GatewayResponse::preflight();
    }
    respond(update(state, request).await)
}

async fn update(state: &AppState, request: &GatewayRequest) -> Result<Character> {
    request.require_method(Method::PUT)?;
    let (subject, payload) = Envelope::parse(request, BodyRequirement::Required)?.into_payload()?;
    let id = request.require_path_parameter("id", CHARACTER_ID_REQUIRED)?;
    let update = validators::character_update(id, payload)?;
    records::update_character(state.characters.as_ref(), &subject, update).await
}

// DELETE /characters/{id}
pub async fn delete_character(state: &AppState, request: &GatewayRequest) -> GatewayResponse {
    if request.is_preflight() {
        return GatewayResponse::preflight();
    }
    respond(delete(state, request).await)
}

async fn delete(state: &AppState, request: &GatewayRequest) -> Result<MessageResponse> {
    request.require_method(Method::DELETE)?;
    let envelope = Envelope::parse(request, BodyRequirement::Ignored)?;
    let id = request.require_path_parameter("id", CHARACTER_ID_REQUIRED)?;
    records::delete_character(
        state.characters.as_ref(),
        state.saves.as_ref(),
        &envelope.subject,
        &id,
    )
    .await?;

    Ok(MessageResponse {
        message: "キャラクターを削除しました".to_string(),
    })
}
