pub mod dynamo_test_utils;
pub mod jwt;
pub mod mock_character_store;
pub mod mock_save_store;
pub mod test_logging;

use crate::error::StoreError;

/// Failure a mock store can be switched to return from every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// The database request itself fails
    Database,
    /// A stored item no longer converts into its record type
    CorruptItem,
}

impl MockFailure {
    pub fn to_error(self, operation: &str) -> StoreError {
        match self {
            MockFailure::Database => StoreError::InternalError(format!(
                "DynamoDB {} error: simulated failure",
                operation
            )),
            MockFailure::CorruptItem => StoreError::SerializationError(format!(
                "DynamoDB item conversion failed in {}: simulated corrupt item",
                operation
            )),
        }
    }
}
