use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{CHARACTER_REQUIRED, SAVE_KEYS_REQUIRED, SAVE_NOT_FOUND};
use crate::tests::utils::{create_test_state, error_body, event, mock_state, send, SEED_TIME};

fn get_save_event(subject: &str, character_id: &str) -> Value {
    event("GET", "/saves/{characterId}")
        .param("characterId", character_id)
        .subject(subject)
        .build()
}

#[tokio::test]
async fn test_create_save_requires_character_id() {
    let (state, _, saves) = mock_state();
    let before = saves.len();

    for payload in [
        json!({}),
        json!({ "character": {} }),
        json!({ "character": { "name": "Hero" } }),
        json!({ "character": { "id": "" } }),
        json!({ "character": "char_a" }),
    ] {
        let (status, body) = send(
            &state,
            event("POST", "/saves")
                .subject("user_1")
                .json_body(payload)
                .build(),
        )
        .await;

        assert_eq!(status, 400);
        assert_eq!(body, error_body(CHARACTER_REQUIRED));
    }
    assert_eq!(saves.len(), before);
}

#[tokio::test]
async fn test_create_save_starts_at_dungeon_entrance() {
    let state = create_test_state().await;

    let (status, body) = send(
        &state,
        event("POST", "/saves")
            .subject("user_1")
            .json_body(json!({ "character": { "id": "char_b", "name": "Mage", "level": 1 } }))
            .build(),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["userId"], "user_1");
    assert_eq!(body["characterId"], "char_b");
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert_eq!(body["character"]["name"], "Mage");
    assert_eq!(body["currentFloor"], 1);
    assert_eq!(body["playerX"], 1);
    assert_eq!(body["playerY"], 6);
    assert_eq!(body["potions"], 3);
    assert_eq!(body["keys"], 0);
    assert_eq!(body["doorStates"], json!({}));
    assert_eq!(body["chestStates"], json!({}));
    assert_eq!(body["messages"], json!([]));
    assert_eq!(
        body["playerPositions"],
        json!({ "1": { "x": 1, "y": 6 }, "2": { "x": 1, "y": 1 }, "3": { "x": 1, "y": 1 } })
    );
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[tokio::test]
async fn test_create_save_replaces_existing_save() {
    let state = create_test_state().await;

    let (status, created) = send(
        &state,
        event("POST", "/saves")
            .subject("user_1")
            .json_body(json!({ "character": { "id": "char_a" }, "currentFloor": 2, "potions": 1 }))
            .build(),
    )
    .await;
    assert_eq!(status, 200);
    assert_ne!(created["id"], "save_a");

    let (status, fetched) = send(&state, get_save_event("user_1", "char_a")).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["currentFloor"], 2);
    assert_eq!(fetched["potions"], 1);
    assert_eq!(fetched["messages"], json!([]));
}

#[tokio::test]
async fn test_get_save_by_character() {
    let state = create_test_state().await;

    let (status, body) = send(&state, get_save_event("user_1", "char_a")).await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], "save_a");
    assert_eq!(body["character"]["level"], 3);
    assert_eq!(body["doorStates"]["1-3-4"], true);
}

#[tokio::test]
async fn test_get_missing_save_is_not_found() {
    let state = create_test_state().await;

    let (status, body) = send(&state, get_save_event("user_1", "char_b")).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "error": "セーブデータが見つかりません" }));

    // Saves of other owners are invisible
    let (status, _) = send(&state, get_save_event("user_1", "char_c")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_update_save_requires_both_ids() {
    let state = create_test_state().await;

    for payload in [
        json!({ "characterId": "char_a", "currentFloor": 2 }),
        json!({ "id": "save_a", "currentFloor": 2 }),
        json!({ "id": "", "characterId": "char_a" }),
    ] {
        let (status, body) = send(
            &state,
            event("PUT", "/saves")
                .subject("user_1")
                .json_body(payload)
                .build(),
        )
        .await;

        assert_eq!(status, 400);
        assert_eq!(body, error_body(SAVE_KEYS_REQUIRED));
    }
}

#[tokio::test]
async fn test_update_save_merges_progress() {
    let state = create_test_state().await;

    let (status, body) = send(
        &state,
        event("PUT", "/saves")
            .subject("user_1")
            .json_body(json!({
                "id": "save_a",
                "characterId": "char_a",
                "userId": "user_2",
                "createdAt": "1999-01-01T00:00:00Z",
                "currentFloor": 2,
                "playerX": 4,
                "playerY": 2,
                "messages": null,
                "chestStates": { "2-5-5": true },
                "playerPositions": { "1": { "x": 8, "y": 3 }, "2": { "x": 4, "y": 2 } },
                "character": { "id": "char_a", "name": "Knight", "level": 4, "hp": 12 }
            }))
            .build(),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], "save_a");
    assert_eq!(body["userId"], "user_1");
    assert_eq!(body["characterId"], "char_a");
    assert_eq!(body["createdAt"], SEED_TIME);
    assert!(body["updatedAt"].as_str().unwrap() > SEED_TIME);
    assert_eq!(body["currentFloor"], 2);
    assert_eq!(body["playerX"], 4);
    assert_eq!(body["messages"], json!([]));
    assert_eq!(body["doorStates"], json!({ "1-3-4": true }));
    assert_eq!(body["chestStates"], json!({ "2-5-5": true }));
    assert_eq!(body["playerPositions"]["1"], json!({ "x": 8, "y": 3 }));
    assert_eq!(body["potions"], 3);
    assert_eq!(body["character"]["level"], 4);

    let (_, fetched) = send(&state, get_save_event("user_1", "char_a")).await;
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_update_missing_save_is_not_found() {
    let state = create_test_state().await;

    let (status, body) = send(
        &state,
        event("PUT", "/saves")
            .subject("user_1")
            .json_body(json!({ "id": "save_x", "characterId": "char_b", "potions": 0 }))
            .build(),
    )
    .await;

    assert_eq!(status, 404);
    assert_eq!(body, error_body(SAVE_NOT_FOUND));
}

#[tokio::test]
async fn test_delete_save_by_save_id() {
    let state = create_test_state().await;

    let (status, body) = send(
        &state,
        event("DELETE", "/saves/{id}")
            .param("id", "save_a")
            .subject("user_1")
            .build(),
    )
    .await;
    assert_eq!(status, 200);
    assert!(body["message"].is_string());

    let (status, _) = send(&state, get_save_event("user_1", "char_a")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_delete_save_is_owner_scoped() {
    let (state, _, saves) = mock_state();
    let before = saves.len();

    // save_c belongs to user_2
    for save_id in ["save_c", "save_missing"] {
        let (status, body) = send(
            &state,
            event("DELETE", "/saves/{id}")
                .param("id", save_id)
                .subject("user_1")
                .build(),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body, error_body(SAVE_NOT_FOUND));
    }
    assert_eq!(saves.len(), before);
}
