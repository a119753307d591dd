use serde_json::json;

use dungeon_shared::store::CharacterStore;

use crate::config::{ConfigError, ServiceConfig};
use crate::envelope::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN};
use crate::error::{CHARACTER_ID_REQUIRED, ROUTE_NOT_FOUND};
use crate::routes::{self, Operation};
use crate::tests::utils::{error_body, event, mock_state, send};

#[tokio::test]
async fn test_options_short_circuits_on_every_route() {
    let (state, _, _) = mock_state();

    for operation in Operation::ALL {
        // No subject and no body: preflight never reaches auth or parsing
        let response =
            routes::dispatch(&state, event("OPTIONS", operation.resource()).build()).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "");
        assert_eq!(response.headers["Access-Control-Allow-Origin"], ALLOW_ORIGIN);
        assert_eq!(response.headers["Access-Control-Allow-Headers"], ALLOW_HEADERS);
        assert_eq!(response.headers["Access-Control-Allow-Methods"], ALLOW_METHODS);
        assert!(!response.headers.contains_key("Content-Type"));
    }
}

#[tokio::test]
async fn test_json_responses_carry_cors_and_content_type() {
    let (state, _, _) = mock_state();

    for request in [
        event("GET", "/characters").subject("user_1").build(),
        event("GET", "/characters").build(),
    ] {
        let response = routes::dispatch(&state, request).await;
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            response.headers["Access-Control-Allow-Methods"],
            "GET,POST,PUT,DELETE,OPTIONS"
        );
        assert_eq!(response.headers["Content-Type"], "application/json");
    }
}

#[tokio::test]
async fn test_non_ascii_text_is_not_escaped() {
    let (state, _, _) = mock_state();

    let response = routes::dispatch(&state, event("GET", "/characters").build()).await;

    assert!(response.body.contains("認証が必要です"));
    assert!(!response.body.contains("\\u"));
}

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let (state, _, _) = mock_state();

    let (status, body) = send(&state, event("GET", "/inventory").subject("user_1").build()).await;
    assert_eq!(status, 404);
    assert_eq!(body, error_body(ROUTE_NOT_FOUND));

    let (status, _) = send(
        &state,
        event("GET", "/characters/a/b").subject("user_1").build(),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_unserved_method_is_not_allowed() {
    let (state, _, _) = mock_state();

    for (method, resource) in [
        ("PATCH", "/characters"),
        ("DELETE", "/characters"),
        ("GET", "/characters/{id}"),
        ("GET", "/saves"),
        ("POST", "/saves/{id}"),
    ] {
        let (status, body) = send(&state, event(method, resource).subject("user_1").build()).await;
        assert_eq!(status, 405, "{} {}", method, resource);
        assert_eq!(body, error_body("Method Not Allowed"));
    }
}

#[tokio::test]
async fn test_routes_by_path_when_resource_is_missing() {
    let (state, characters, _) = mock_state();
    let before = characters.len();

    let (status, _) = send(
        &state,
        event("DELETE", "/characters/{id}")
            .without_resource()
            .path("/Prod/characters/char_b")
            .subject("user_1")
            .build(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(characters.len(), before - 1);

    let (status, body) = send(
        &state,
        event("GET", "/saves/{characterId}")
            .without_resource()
            .path("/saves/char_a")
            .subject("user_1")
            .build(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], "save_a");
}

#[tokio::test]
async fn test_renamed_template_reads_its_own_parameter() {
    let (state, characters, _) = mock_state();

    let (status, _) = send(
        &state,
        event("DELETE", "/characters/{characterKey}")
            .param("characterKey", "char_b")
            .param("slot", "char_a")
            .subject("user_1")
            .build(),
    )
    .await;

    assert_eq!(status, 200);
    assert!(characters.get_character("user_1", "char_b").await.is_err());
    assert!(characters.get_character("user_1", "char_a").await.is_ok());
}

#[tokio::test]
async fn test_item_route_without_key_is_a_bad_request() {
    let (state, _, _) = mock_state();

    let (status, body) = send(
        &state,
        event("DELETE", "/characters/{id}").subject("user_1").build(),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body, error_body(CHARACTER_ID_REQUIRED));
}

#[tokio::test]
async fn test_pinned_handler_serves_only_its_operation() {
    let (state, _, _) = mock_state();
    let state = state.pinned_to(Some(Operation::CreateCharacter));

    let (status, _) = send(&state, event("GET", "/characters").subject("user_1").build()).await;
    assert_eq!(status, 405);

    // The resource is irrelevant once the function is pinned
    let (status, body) = send(
        &state,
        event("POST", "/anything")
            .subject("user_1")
            .json_body(json!({ "name": "Hero" }))
            .build(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Hero");

    let (status, _) = send(&state, event("OPTIONS", "/anything").build()).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_malformed_event_is_an_internal_error() {
    let (state, _, _) = mock_state();

    let response = routes::dispatch(&state, json!({ "httpMethod": 42 })).await;

    assert_eq!(response.status_code, 500);
    assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
}

#[test]
fn test_operation_names_round_trip() {
    for operation in Operation::ALL {
        assert_eq!(operation.name().parse::<Operation>(), Ok(operation));
    }
    assert_eq!("DELETE_SAVE".parse::<Operation>(), Ok(Operation::DeleteSave));
    assert!("drop-table".parse::<Operation>().is_err());
}

#[test]
fn test_operation_methods_match_route_table() {
    assert_eq!(Operation::ListCharacters.method(), http::Method::GET);
    assert_eq!(Operation::UpdateSave.method(), http::Method::PUT);
    assert_eq!(Operation::GetSave.resource(), "/saves/{characterId}");
    assert_eq!(Operation::DeleteSave.path_parameter(), Some("id"));
}

#[test]
fn test_config_defaults() {
    let config = ServiceConfig::from_lookup(|_| None).unwrap();

    assert_eq!(config.characters_table, "characters");
    assert_eq!(config.saves_table, "game-saves");
    assert_eq!(config.handler, None);
    assert_eq!(config.local_addr, None);
}

#[test]
fn test_config_reads_overrides() {
    let config = ServiceConfig::from_lookup(|key| match key {
        "CHARACTERS_TABLE" => Some("dev-characters".to_string()),
        "GAME_HANDLER" => Some("get-save".to_string()),
        "LOCAL_ADDR" => Some("127.0.0.1:3001".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.characters_table, "dev-characters");
    assert_eq!(config.saves_table, "game-saves");
    assert_eq!(config.handler, Some(Operation::GetSave));
    assert_eq!(config.local_addr.map(|a| a.port()), Some(3001));
}

#[test]
fn test_config_rejects_bad_values() {
    let bad_handler = ServiceConfig::from_lookup(|key| {
        (key == "GAME_HANDLER").then(|| "everything".to_string())
    });
    assert!(matches!(bad_handler, Err(ConfigError::InvalidHandler(_))));

    let bad_addr =
        ServiceConfig::from_lookup(|key| (key == "LOCAL_ADDR").then(|| "localhost".to_string()));
    assert!(matches!(bad_addr, Err(ConfigError::InvalidLocalAddr(_))));
}
