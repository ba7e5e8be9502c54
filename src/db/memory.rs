use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::db::models::Identity;
use crate::db::IdentityStore;
use crate::error::DatabaseError;

/// In-process identity store keyed by id. Counts lookups so callers can
/// check which paths reached the store.
#[derive(Default)]
pub struct MemoryIdentityStore {
    identities: RwLock<HashMap<String, Identity>>,
    lookups: AtomicUsize,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an identity. Email uniqueness is the caller's job.
    pub async fn insert(&self, identity: Identity) {
        self.identities.write().await.insert(identity.id.clone(), identity);
    }

    pub async fn remove(&self, id: &str) -> Option<Identity> {
        self.identities.write().await.remove(id)
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, DatabaseError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let identities = self.identities.read().await;
        Ok(identities.values().find(|i| i.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, DatabaseError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.identities.read().await.get(id).cloned())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_find_remove() {
        let store = MemoryIdentityStore::new();
        store.insert(Identity::new("a@x.com".into(), "hash".into()).with_id("u1")).await;

        let by_email = store.find_by_email("a@x.com").await.unwrap();
        assert_eq!(by_email.map(|i| i.id), Some("u1".to_string()));
        assert!(store.find_by_id("u1").await.unwrap().is_some());
        assert!(store.find_by_email("nobody@x.com").await.unwrap().is_none());
        assert_eq!(store.lookup_count(), 3);

        assert!(store.remove("u1").await.is_some());
        assert!(store.find_by_id("u1").await.unwrap().is_none());
    }
}
