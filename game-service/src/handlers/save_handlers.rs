use http::Method;

use dungeon_shared::models::{GameSave, MessageResponse};

use crate::envelope::{BodyRequirement, Envelope, GatewayRequest, GatewayResponse};
use crate::error::{Result, CHARACTER_ID_REQUIRED, SAVE_ID_REQUIRED};
use crate::handlers::{respond, AppState};
use crate::{records, validators};

// POST /saves
pub async fn create_save(state: &AppState, request: &GatewayRequest) -> GatewayResponse {
    if request.is_preflight() {
        return GatewayResponse::preflight();
    }
    respond(create(state, request).await)
}

async fn create(state: &AppState, request: &GatewayRequest) -> Result<GameSave> {
    request.require_method(Method::POST)?;
    let (subject, payload) = Envelope::parse(request, BodyRequirement::Required)?.into_payload()?;
    let create = validators::save_create(payload)?;
    records::create_save(state.saves.as_ref(), &subject, create).await
}

// GET /saves/{characterId}
pub async fn get_save(state: &AppState, request: &GatewayRequest) -> GatewayResponse {
    if request.is_preflight() {
        return GatewayResponse::preflight();
    }
    respond(get(state, request).await)
}

async fn get(state: &AppState, request: &GatewayRequest) -> Result<GameSave> {
    request.require_method(Method::GET)?;
    let envelope = Envelope::parse(request, BodyRequirement::Ignored)?;
    let character_id = request.require_path_parameter("characterId", CHARACTER_ID_REQUIRED)?;
    records::get_save(state.saves.as_ref(), &envelope.subject, &character_id).await
}

// PUT /saves
pub async fn update_save(state: &AppState, request: &GatewayRequest) -> GatewayResponse {
    if request.is_preflight() {
        return GatewayResponse::preflight();
    }
    respond(update(state, request).await)
}

async fn update(state: &AppState, request: &GatewayRequest) -> Result<GameSave> {
    request.require_method(Method::PUT)?;
    let (subject, payload) = Envelope::parse(request, BodyRequirement::Required)?.into_payload()?;
    let update = validators::save_update(payload)?;
    records::update_save(state.saves.as_ref(), &subject, update).await
}

// DELETE /saves/{id}
pub async fn delete_save(state: &AppState, request: &GatewayRequest) -> GatewayResponse {
    if request.is_preflight() {
        return GatewayResponse::preflight();
    }
    respond(delete(state, request).await)
}

async fn delete(state: &AppState, request: &GatewayRequest) -> Result<MessageResponse> {
    request.require_method(Method::DELETE)?;
    let envelope = Envelope::parse(request, BodyRequirement::Ignored)?;
    let save_id = request.require_path_parameter("id", SAVE_ID_REQUIRED)?;
    records::delete_save(state.saves.as_ref(), &envelope.subject, &save_id).await?;

    Ok(MessageResponse {
        message: "セーブデータを削除しました".to_string(),
    })
}
