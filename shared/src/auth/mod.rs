use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StoreError};

// Cognito ID token claims we care about; everything else stays in `extra`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(
        rename = "cognito:username",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cognito_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "token_use", default, skip_serializing_if = "Option::is_none")]
    pub token_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Decodes the payload segment of a JWT without verifying the signature.
///
/// Signature checks belong to the gateway authorizer; callers only use this to
/// read claims from a token that has already been (or will be) verified there.
pub fn decode_jwt_payload(token: &str) -> Result<Value> {
    tracing::debug!("Decoding JWT payload");

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::warn!("Invalid JWT format: expected 3 parts, got {}", parts.len());
        return Err(StoreError::AuthError("Invalid JWT format".into()));
    }

    // Cognito omits padding, but tolerate tokens that carry it
    let payload_data = match URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')) {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!("Failed to base64 decode JWT payload: {:?}", err);
            return Err(StoreError::AuthError("Could not decode JWT payload".into()));
        }
    };

    serde_json::from_slice::<Value>(&payload_data).map_err(|err| {
        tracing::warn!("Failed to parse JWT payload as JSON: {:?}", err);
        StoreError::AuthError("Could not parse JWT payload".into())
    })
}

/// Decodes a JWT payload into typed claims.
pub fn decode_jwt_claims(token: &str) -> Result<Claims> {
    let payload = decode_jwt_payload(token)?;
    let claims: Claims = serde_json::from_value(payload).map_err(|err| {
        tracing::warn!("Failed to parse JWT claims: {:?}", err);
        StoreError::AuthError("Could not parse JWT claims".into())
    })?;
    tracing::debug!("JWT claims parsed successfully: sub={}", claims.sub);
    Ok(claims)
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
