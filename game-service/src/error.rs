use http::StatusCode;
use thiserror::Error;

use dungeon_shared::error::StoreError;
use dungeon_shared::models::ErrorResponse;

use crate::envelope::GatewayResponse;

pub const INVALID_JSON: &str = "無効なJSONです";
pub const INVALID_FIELDS: &str = "入力値が不正です";
pub const NAME_REQUIRED: &str = "キャラクター名は必須です";
pub const CHARACTER_REQUIRED: &str = "キャラクター情報が必要です";
pub const SAVE_KEYS_REQUIRED: &str = "セーブデータIDとキャラクターIDが必要です";
pub const CHARACTER_ID_REQUIRED: &str = "キャラクターIDが必要です";
pub const SAVE_ID_REQUIRED: &str = "セーブデータIDが必要です";
pub const CHARACTER_NOT_FOUND: &str = "キャラクターが見つかりません";
pub const SAVE_NOT_FOUND: &str = "セーブデータが見つかりません";
pub const ROUTE_NOT_FOUND: &str = "リソースが見つかりません";

// Returned when a stored record cannot be converted, per operation
pub const LIST_CHARACTERS_FAILED: &str = "キャラクター一覧の取得に失敗しました";
pub const CREATE_CHARACTER_FAILED: &str = "キャラクターの作成に失敗しました";
pub const UPDATE_CHARACTER_FAILED: &str = "キャラクターの更新に失敗しました";
pub const DELETE_CHARACTER_FAILED: &str = "キャラクターの削除に失敗しました";
pub const CREATE_SAVE_FAILED: &str = "ゲームの保存に失敗しました";
pub const GET_SAVE_FAILED: &str = "セーブデータの取得に失敗しました";
pub const UPDATE_SAVE_FAILED: &str = "セーブデータの更新に失敗しました";
pub const DELETE_SAVE_FAILED: &str = "セーブデータの削除に失敗しました";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("認証が必要です")]
    Unauthenticated,

    #[error("{0}")]
    InvalidPayload(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    NotFound(String),

    #[error("データベースエラーが発生しました")]
    Store(#[source] StoreError),

    #[error("{0}")]
    Unexpected(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into a `{"error": message}` response with CORS headers.
    pub fn into_response(self) -> GatewayResponse {
        let status = self.status_code();
        match &self {
            AppError::Unauthenticated | AppError::MethodNotAllowed => {
                tracing::warn!("Rejected request: {}", self)
            }
            AppError::InvalidPayload(msg) => tracing::warn!("Bad request error: {}", msg),
            AppError::NotFound(msg) => tracing::warn!("Not found error: {}", msg),
            AppError::Store(err) => tracing::error!("Store error: {}", err),
            AppError::Unexpected(msg) => tracing::error!("Unexpected error: {}", msg),
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        tracing::info!(
            "Returning error response: status={}, message={}",
            status,
            body.error
        );
        GatewayResponse::json(status, &body)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::ValidationError(msg) => AppError::InvalidPayload(msg),
            other => AppError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
