//! Local HTTP front end that stands in for API Gateway and its Cognito
//! authorizer, so the handlers can be exercised with curl or the auth tools.
//!
//! Bearer tokens are decoded without signature verification.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use dungeon_shared::auth::{bearer_token, decode_jwt_claims};

use crate::envelope::{GatewayRequest, GatewayResponse};
use crate::handlers::AppState;
use crate::routes;

// Request bodies above this are rejected before reaching a handler
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(forward)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    tracing::info!("Local gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state).into_make_service()).await
}

async fn forward(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let event = match to_event(request).await {
        Ok(event) => event,
        Err(response) => return response,
    };
    into_http(routes::dispatch(&state, event).await)
}

/// Builds the proxy event the gateway would have delivered for `request`.
pub async fn to_event(request: Request) -> Result<Value, Response> {
    let (parts, body) = request.into_parts();

    let subject = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .and_then(|token| match decode_jwt_claims(token) {
            Ok(claims) => Some(claims.sub),
            Err(err) => {
                tracing::warn!("Ignoring unreadable bearer token: {}", err);
                None
            }
        });

    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|err| {
        tracing::warn!("Failed to read request body: {}", err);
        (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()).into_response()
    })?;

    let (body, is_base64_encoded) = if bytes.is_empty() {
        (None, Some(false))
    } else {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => (Some(text), Some(false)),
            Err(_) => (Some(STANDARD.encode(&bytes)), Some(true)),
        }
    };

    let mut event = GatewayRequest {
        http_method: parts.method.as_str().to_string(),
        path: Some(parts.uri.path().to_string()),
        body,
        is_base64_encoded,
        ..GatewayRequest::default()
    };
    if let Some(subject) = subject {
        event = event.with_subject(&subject);
    }

    serde_json::to_value(&event).map_err(|err| {
        tracing::error!("Failed to build gateway event: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

/// Converts a proxy response envelope back into an HTTP response.
pub fn into_http(envelope: GatewayResponse) -> Response {
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let builder = envelope
        .headers
        .iter()
        .fold(Response::builder().status(status), |builder, (name, value)| {
            builder.header(name.as_str(), value.as_str())
        });

    let body = if envelope.is_base64_encoded {
        match STANDARD.decode(&envelope.body) {
            Ok(bytes) => Body::from(bytes),
            Err(err) => {
                tracing::error!("Response body is not valid base64: {}", err);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    } else {
        Body::from(envelope.body)
    };

    builder.body(body).unwrap_or_else(|err| {
        tracing::error!("Failed to build HTTP response: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
