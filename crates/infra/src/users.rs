//! In-memory user store for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use tradedesk_auth::{StoreError, UserRecord, UserStore};
use tradedesk_core::UserId;

/// Users keyed by subject id only; lookups are not tenant-filtered.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, user: UserRecord) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(user.id, user);
        }
    }

    pub fn set_active(&self, id: UserId, active: bool) {
        if let Ok(mut map) = self.inner.write() {
            if let Some(user) = map.get_mut(&id) {
                user.active = active;
            }
        }
    }

    pub fn remove(&self, id: UserId) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(&id);
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("user store lock poisoned".to_string()))?;
        Ok(map.get(&id).cloned())
    }
}
