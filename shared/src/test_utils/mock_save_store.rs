use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::models::GameSave;
use crate::store::SaveStore;

use super::MockFailure;

/// MockSaveStore is an in-memory implementation of SaveStore for testing.
///
/// `fail_deletes` makes every delete return an internal error, which is how
/// tests drive the advisory save cleanup after a character is deleted.
/// `set_failure` makes every call fail.
#[derive(Default)]
pub struct MockSaveStore {
    saves: Mutex<BTreeMap<(String, String), GameSave>>,
    failure: Mutex<Option<MockFailure>>,
    fail_deletes: AtomicBool,
    delete_attempts: AtomicUsize,
}

impl MockSaveStore {
    /// Create a new empty MockSaveStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MockSaveStore with initial test data
    pub fn with_data(saves: Vec<GameSave>) -> Self {
        let store = Self::new();
        {
            let mut map = store.saves.lock().unwrap();
            for save in saves {
                map.insert((save.user_id.clone(), save.character_id.clone()), save);
            }
        }
        store
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn set_failure(&self, failure: Option<MockFailure>) {
        *self.failure.lock().unwrap() = failure;
    }

    fn check(&self, operation: &str) -> Result<()> {
        match *self.failure.lock().unwrap() {
            Some(failure) => Err(failure.to_error(operation)),
            None => Ok(()),
        }
    }

    /// How many deletes were attempted, failed ones included
    pub fn delete_attempts(&self) -> usize {
        self.delete_attempts.load(Ordering::SeqCst)
    }

    /// Number of stored saves across all users
    pub fn len(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SaveStore for MockSaveStore {
    async fn create_save(&self, save: GameSave) -> Result<GameSave> {
        self.check("put_item")?;
        self.saves.lock().unwrap().insert(
            (save.user_id.clone(), save.character_id.clone()),
            save.clone(),
        );
        Ok(save)
    }

    async fn get_save(&self, user_id: &str, character_id: &str) -> Result<GameSave> {
        self.check("get_item")?;
        self.saves
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), character_id.to_string()))
            .cloned()
            .ok_or_else(|| {
                StoreError::NotFound(format!("Save not found for character: {}", character_id))
            })
    }

    async fn find_save_by_id(&self, user_id: &str, save_id: &str) -> Result<GameSave> {
        self.check("scan")?;
        self.saves
            .lock()
            .unwrap()
            .values()
            .find(|save| save.user_id == user_id && save.id == save_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Save not found: {}", save_id)))
    }

    async fn update_save(&self, save: GameSave) -> Result<GameSave> {
        self.create_save(save).await
    }

    async fn delete_save(&self, user_id: &str, character_id: &str) -> Result<()> {
        self.delete_attempts.fetch_add(1, Ordering::SeqCst);
        self.check("delete_item")?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::InternalError(
                "DynamoDB delete_item error: simulated failure".to_string(),
            ));
        }

        self.saves
            .lock()
            .unwrap()
            .remove(&(user_id.to_string(), character_id.to_string()));
        Ok(())
    }
}
