use http::Method;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::envelope::{GatewayRequest, GatewayResponse};
use crate::error::{AppError, ROUTE_NOT_FOUND};
use crate::handlers::{self, AppState};

/// One served endpoint. The kebab-case name is what `GAME_HANDLER` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListCharacters,
    CreateCharacter,
    UpdateCharacter,
    DeleteCharacter,
    CreateSave,
    GetSave,
    UpdateSave,
    DeleteSave,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::ListCharacters,
        Operation::CreateCharacter,
        Operation::UpdateCharacter,
        Operation::DeleteCharacter,
        Operation::CreateSave,
        Operation::GetSave,
        Operation::UpdateSave,
        Operation::DeleteSave,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::ListCharacters => "list-characters",
            Operation::CreateCharacter => "create-character",
            Operation::UpdateCharacter => "update-character",
            Operation::DeleteCharacter => "delete-character",
            Operation::CreateSave => "create-save",
            Operation::GetSave => "get-save",
            Operation::UpdateSave => "update-save",
            Operation::DeleteSave => "delete-save",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Operation::ListCharacters | Operation::GetSave => Method::GET,
            Operation::CreateCharacter | Operation::CreateSave => Method::POST,
            Operation::UpdateCharacter | Operation::UpdateSave => Method::PUT,
            Operation::DeleteCharacter | Operation::DeleteSave => Method::DELETE,
        }
    }

    pub fn resource(self) -> &'static str {
        match self {
            Operation::ListCharacters | Operation::CreateCharacter => "/characters",
            Operation::UpdateCharacter | Operation::DeleteCharacter => "/characters/{id}",
            Operation::CreateSave | Operation::UpdateSave => "/saves",
            Operation::GetSave => "/saves/{characterId}",
            Operation::DeleteSave => "/saves/{id}",
        }
    }

    /// Path parameter carrying the record key, for item routes.
    pub fn path_parameter(self) -> Option<&'static str> {
        match self {
            Operation::UpdateCharacter | Operation::DeleteCharacter | Operation::DeleteSave => {
                Some("id")
            }
            Operation::GetSave => Some("characterId"),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Operation::ALL.iter().map(|op| op.name()).collect();
                format!("unknown operation '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Characters,
    Saves,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    Matched(Operation),
    MethodNotAllowed,
    NotFound,
}

// Segments after the collection name; a leading stage prefix such as `/Prod` is skipped
fn locate(route: &str) -> Option<(Collection, Vec<&str>)> {
    let segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();
    let start = segments
        .iter()
        .position(|s| *s == "characters" || *s == "saves")?;
    let collection = if segments[start] == "characters" {
        Collection::Characters
    } else {
        Collection::Saves
    };
    Some((collection, segments[start + 1..].to_vec()))
}

fn is_template(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

/// Picks the operation for a request, routing by `resource` and falling back
/// to `path`. Item routes get their key copied into the operation's path
/// parameter when the event only carried it in the path.
pub fn resolve(request: &mut GatewayRequest) -> Route {
    let route = request
        .resource
        .clone()
        .filter(|r| !r.is_empty() && r != "/{proxy+}")
        .or_else(|| request.path.clone())
        .unwrap_or_default();

    let Some((collection, rest)) = locate(&route) else {
        tracing::warn!("No route for {}", route);
        return Route::NotFound;
    };

    let item = match rest.as_slice() {
        [] => None,
        [segment] => Some(*segment),
        _ => {
            tracing::warn!("No route for {}", route);
            return Route::NotFound;
        }
    };

    let method = request.method();
    let operation = match (collection, item.is_some(), method.as_ref().map(Method::as_str)) {
        (Collection::Characters, false, Some("GET")) => Operation::ListCharacters,
        (Collection::Characters, false, Some("POST")) => Operation::CreateCharacter,
        (Collection::Characters, true, Some("PUT")) => Operation::UpdateCharacter,
        (Collection::Characters, true, Some("DELETE")) => Operation::DeleteCharacter,
        (Collection::Saves, false, Some("POST")) => Operation::CreateSave,
        (Collection::Saves, false, Some("PUT")) => Operation::UpdateSave,
        (Collection::Saves, true, Some("GET")) => Operation::GetSave,
        (Collection::Saves, true, Some("DELETE")) => Operation::DeleteSave,
        _ => {
            tracing::warn!("Method {} not served on {}", request.http_method, route);
            return Route::MethodNotAllowed;
        }
    };

    if let (Some(segment), Some(param)) = (item, operation.path_parameter()) {
        if request.path_parameter(param).is_none() {
            let value = if is_template(segment) {
                // Gateway used a differently named template; read the value bound to that name
                let bound = segment.trim_start_matches('{').trim_end_matches('}');
                request.path_parameter(bound).map(str::to_string)
            } else {
                Some(segment.to_string())
            };
            if let Some(value) = value {
                request.set_path_parameter(param, &value);
            }
        }
    }

    Route::Matched(operation)
}

/// Entry point for one gateway event.
pub async fn dispatch(state: &AppState, event: Value) -> GatewayResponse {
    let mut request = match GatewayRequest::from_event(event) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };

    tracing::info!(
        "Received request: method={}, resource={:?}, path={:?}",
        request.http_method,
        request.resource,
        request.path
    );

    if request.is_preflight() {
        return GatewayResponse::preflight();
    }

    let response = match state.pinned {
        Some(operation) => handlers::invoke(operation, state, &request).await,
        None => match resolve(&mut request) {
            Route::Matched(operation) => handlers::invoke(operation, state, &request).await,
            Route::MethodNotAllowed => AppError::MethodNotAllowed.into_response(),
            Route::NotFound => AppError::NotFound(ROUTE_NOT_FOUND.to_string()).into_response(),
        },
    };

    tracing::info!("Returning response: status={}", response.status_code);
    response
}
