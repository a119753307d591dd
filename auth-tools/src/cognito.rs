//! Cognito user-pool login over `AdminInitiateAuth` (`ADMIN_NO_SRP_AUTH`).

use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_cognitoidentityprovider::types::AuthFlowType;
use aws_sdk_cognitoidentityprovider::Client;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Cognito認証エラー: {code}\n   メッセージ: {message}")]
    Service { code: String, message: String },

    #[error("Cognitoへの接続に失敗しました: {0}")]
    Transport(String),

    #[error("認証結果が空です")]
    MissingResult,

    #[error("Secret Hashの計算に失敗しました: {0}")]
    SecretHash(String),
}

impl AuthError {
    /// Follow-up advice for the well-known Cognito error codes.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AuthError::Service { code, .. } => error_hint(code),
            _ => None,
        }
    }
}

pub fn error_hint(code: &str) -> Option<&'static str> {
    match code {
        "NotAuthorizedException" => Some("ユーザー名またはパスワードが間違っています"),
        "UserNotFoundException" => Some("指定されたユーザーが見つかりません"),
        "UserNotConfirmedException" => Some("ユーザーのメール確認が完了していません"),
        "TooManyRequestsException" => {
            Some("リクエスト数が多すぎます。しばらく待ってから再試行してください")
        }
        _ => None,
    }
}

pub fn challenge_hint(challenge: &str) -> &'static str {
    match challenge {
        "NEW_PASSWORD_REQUIRED" => "新しいパスワードの設定が必要です。",
        "MFA_SETUP" => "MFAセットアップが必要です。",
        _ => "未対応のチャレンジです。",
    }
}

/// `base64(HMAC-SHA256(client_secret, username + client_id))`, required by app
/// clients that have a secret.
pub fn secret_hash(client_secret: &str, username: &str, client_id: &str) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .map_err(|err| AuthError::SecretHash(err.to_string()))?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Clone)]
pub struct CognitoSettings {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Tokens {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub expires_in: i32,
}

#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Authenticated(Tokens),
    /// Cognito wants another step (new password, MFA, ...) that these tools do not handle.
    Challenge(String),
}

pub struct CognitoAuthenticator {
    client: Client,
    settings: CognitoSettings,
}

impl CognitoAuthenticator {
    pub async fn new(settings: CognitoSettings) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()))
            .load()
            .await;

        Self {
            client: Client::new(&config),
            settings,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let mut request = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.settings.user_pool_id)
            .client_id(&self.settings.client_id)
            .auth_flow(AuthFlowType::AdminNoSrpAuth)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password);

        if let Some(secret) = self.settings.client_secret.as_deref() {
            let hash = secret_hash(secret, username, &self.settings.client_id)?;
            request = request.auth_parameters("SECRET_HASH", hash);
        }

        tracing::debug!("Calling AdminInitiateAuth for {}", username);
        let response = request.send().await.map_err(|err| match err.code() {
            Some(code) => AuthError::Service {
                code: code.to_string(),
                message: err.message().unwrap_or_default().to_string(),
            },
            None => AuthError::Transport(DisplayErrorContext(&err).to_string()),
        })?;

        if let Some(challenge) = response.challenge_name() {
            return Ok(LoginOutcome::Challenge(challenge.as_str().to_string()));
        }

        let result = response
            .authentication_result()
            .ok_or(AuthError::MissingResult)?;

        Ok(LoginOutcome::Authenticated(Tokens {
            id_token: result.id_token().map(str::to_string),
            access_token: result.access_token().map(str::to_string),
            expires_in: result.expires_in(),
        }))
    }
}
