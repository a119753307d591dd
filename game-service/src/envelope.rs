//! API Gateway proxy envelopes: the inbound event, the parsed request a
//! handler works with, and the response shape the gateway expects back.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::error::{AppError, Result, INVALID_JSON};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type,Authorization";
pub const ALLOW_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";

/// REST API proxy event, trimmed to the fields the handlers read.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: Option<bool>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct RequestContext {
    #[serde(default)]
    pub authorizer: Option<Authorizer>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Authorizer {
    #[serde(default)]
    pub claims: Option<AuthorizerClaims>,
}

// Cognito user-pool authorizers pass every claim through as a string
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct AuthorizerClaims {
    #[serde(default)]
    pub sub: Option<String>,
}

impl GatewayRequest {
    /// Parses a raw Lambda payload.
    pub fn from_event(event: Value) -> Result<Self> {
        serde_json::from_value(event).map_err(|err| {
            tracing::error!("Failed to parse gateway event: {}", err);
            AppError::Unexpected("リクエストの処理に失敗しました".to_string())
        })
    }

    pub fn method(&self) -> Option<Method> {
        Method::from_bytes(self.http_method.to_ascii_uppercase().as_bytes()).ok()
    }

    pub fn is_preflight(&self) -> bool {
        self.method() == Some(Method::OPTIONS)
    }

    /// Fails with `MethodNotAllowed` unless the request uses `expected`.
    pub fn require_method(&self, expected: Method) -> Result<()> {
        match self.method() {
            Some(method) if method == expected => Ok(()),
            other => {
                tracing::warn!(
                    "Method {:?} not allowed, expected {}",
                    other.as_ref().map(Method::as_str).unwrap_or(&self.http_method),
                    expected
                );
                Err(AppError::MethodNotAllowed)
            }
        }
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Required path parameter, `InvalidPayload` with `message` when missing.
    pub fn require_path_parameter(&self, name: &str, message: &str) -> Result<String> {
        self.path_parameter(name)
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidPayload(message.to_string()))
    }

    pub fn set_path_parameter(&mut self, name: &str, value: &str) {
        self.path_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
    }

    /// Subject id from the authorizer claims, if present and non-empty.
    pub fn subject(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.authorizer.as_ref())
            .and_then(|authorizer| authorizer.claims.as_ref())
            .and_then(|claims| claims.sub.as_deref())
            .map(str::trim)
            .filter(|sub| !sub.is_empty())
    }

    /// Attaches authorizer claims the way the gateway would.
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.request_context = Some(RequestContext {
            authorizer: Some(Authorizer {
                claims: Some(AuthorizerClaims {
                    sub: Some(subject.to_string()),
                }),
            }),
        });
        self
    }

    /// Body text, base64-decoded when the gateway flagged it. Blank bodies count
    /// as absent.
    fn body_text(&self) -> Result<Option<String>> {
        let Some(body) = self.body.as_deref() else {
            return Ok(None);
        };

        let text = if self.is_base64_encoded.unwrap_or(false) {
            let bytes = STANDARD.decode(body.trim()).map_err(|err| {
                tracing::warn!("Failed to base64 decode request body: {}", err);
                AppError::InvalidPayload(INVALID_JSON.to_string())
            })?;
            String::from_utf8(bytes).map_err(|err| {
                tracing::warn!("Request body is not UTF-8: {}", err);
                AppError::InvalidPayload(INVALID_JSON.to_string())
            })?
        } else {
            body.to_string()
        };

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRequirement {
    Required,
    Ignored,
}

/// An authenticated request with its JSON payload parsed.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub subject: String,
    pub payload: Option<Value>,
}

impl Envelope {
    /// Extracts the subject, then the body. Authentication is checked first so
    /// an anonymous caller never learns anything about payload validation.
    pub fn parse(request: &GatewayRequest, body: BodyRequirement) -> Result<Self> {
        let subject = request.subject().ok_or_else(|| {
            tracing::warn!("Request has no authorizer subject claim");
            AppError::Unauthenticated
        })?;

        let payload = match body {
            BodyRequirement::Ignored => None,
            BodyRequirement::Required => {
                let text = request.body_text()?.ok_or_else(|| {
                    tracing::warn!("Request body is missing");
                    AppError::InvalidPayload(INVALID_JSON.to_string())
                })?;
                let value = serde_json::from_str::<Value>(&text).map_err(|err| {
                    tracing::warn!("Request body is not valid JSON: {}", err);
                    AppError::InvalidPayload(INVALID_JSON.to_string())
                })?;
                Some(value)
            }
        };

        tracing::debug!("Parsed request envelope for subject {}", subject);
        Ok(Self {
            subject: subject.to_string(),
            payload,
        })
    }

    /// The parsed body; only valid for envelopes parsed with a required body.
    pub fn into_payload(self) -> Result<(String, Value)> {
        match self.payload {
            Some(payload) => Ok((self.subject, payload)),
            None => Err(AppError::InvalidPayload(INVALID_JSON.to_string())),
        }
    }
}

/// The `{statusCode, headers, body}` proxy response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

fn cors_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "Access-Control-Allow-Origin".to_string(),
            ALLOW_ORIGIN.to_string(),
        ),
        (
            "Access-Control-Allow-Headers".to_string(),
            ALLOW_HEADERS.to_string(),
        ),
        (
            "Access-Control-Allow-Methods".to_string(),
            ALLOW_METHODS.to_string(),
        ),
    ])
}

impl GatewayResponse {
    /// CORS preflight answer: 200, CORS headers, empty body.
    pub fn preflight() -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            headers: cors_headers(),
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => {
                let mut headers = cors_headers();
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                Self {
                    status_code: status.as_u16(),
                    headers,
                    body,
                    is_base64_encoded: false,
                }
            }
            Err(err) => AppError::Unexpected(format!("レスポンスの生成に失敗しました: {}", err))
                .into_response(),
        }
    }

    pub fn ok<T: Serialize>(value: &T) -> Self {
        Self::json(StatusCode::OK, value)
    }
}
