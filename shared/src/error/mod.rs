use aws_sdk_dynamodb::error::SdkError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    /// A record could not be converted to or from its stored form
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),
}

// Helper function to map general DynamoDB errors
pub fn map_dynamo_error<E>(operation: &str, err: SdkError<E>) -> StoreError
where
    E: std::error::Error + 'static,
{
    StoreError::InternalError(format!(
        "DynamoDB {} error: {}",
        operation,
        aws_sdk_dynamodb::error::DisplayErrorContext(&err)
    ))
}

impl From<serde_dynamo::Error> for StoreError {
    fn from(err: serde_dynamo::Error) -> Self {
        StoreError::SerializationError(format!("DynamoDB item conversion failed: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(format!("JSON conversion failed: {}", err))
    }
}
