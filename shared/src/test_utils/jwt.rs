use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

/// Creates a Cognito-shaped ID token for `user_id`.
///
/// Signed with HS256 and a throwaway secret: consumers only decode the
/// payload, signature checks happen in the gateway authorizer.
pub fn create_jwt_token(user_id: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before Unix epoch")
        .as_secs();

    let claims = json!({
        "sub": user_id,
        "email_verified": true,
        "iss": "https://cognito-idp.ap-northeast-1.amazonaws.com/ap-northeast-1_TestPool",
        "cognito:username": user_id,
        "aud": "test-client-id",
        "token_use": "id",
        "auth_time": now - 100,
        "exp": now + 3600,
        "iat": now - 100,
        "email": "player@example.com",
    });

    let encoding_key = EncodingKey::from_secret(b"test_secret_key_for_jwt_encoding_in_tests");
    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key).expect("Failed to create JWT")
}

/// Helper function to create an authorization header with a bearer token
pub fn create_auth_header(user_id: &str) -> (String, String) {
    let token = create_jwt_token(user_id);
    ("authorization".to_string(), format!("Bearer {}", token))
}
