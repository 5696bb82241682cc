use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::{SecretStore, StoreError};
use crate::secret::{Expiration, SecretId};

/// In-process store backed by a locked map.
///
/// Expired entries are invisible to reads and dropped lazily when
///  touched, or in bulk by [`MemoryStore::purge_expired`]. Uses the
///  tokio clock so paused-time tests can step past a ttl.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<SecretId, Entry>>>,
}

#[derive(Debug)]
struct Entry {
    payload: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.inner.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn put(&self, id: &SecretId, payload: &[u8], ttl: Expiration) -> Result<(), StoreError> {
        let entry = Entry {
            payload: payload.to_vec(),
            expires_at: Instant::now() + ttl.as_duration(),
        };
        self.inner.lock().insert(*id, entry);
        Ok(())
    }

    async fn get(&self, id: &SecretId) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let mut entries = self.inner.lock();
        match entries.get(id) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.payload.clone())),
            Some(_) => {
                entries.remove(id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &SecretId) -> Result<bool, StoreError> {
        let now = Instant::now();
        Ok(self
            .inner
            .lock()
            .remove(id)
            .is_some_and(|entry| entry.is_live(now)))
    }

    /// Read and remove under one lock acquisition.
    async fn take(&self, id: &SecretId) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        Ok(self
            .inner
            .lock()
            .remove(id)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.payload))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::secret::{IdGenerator, UuidV4Generator};

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        let id = UuidV4Generator.generate();

        assert_eq!(store.get(&id).await.unwrap(), None);
        store.put(&id, b"payload", Expiration::OneDay).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), Some(b"payload".to_vec()));
        // reads don't consume
        assert_eq!(store.get(&id).await.unwrap(), Some(b"payload".to_vec()));

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert_eq!(store.get(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_take_is_single_use() {
        let store = MemoryStore::new();
        let id = UuidV4Generator.generate();
        store.put(&id, b"once", Expiration::OneHour).await.unwrap();

        assert_eq!(store.take(&id).await.unwrap(), Some(b"once".to_vec()));
        assert_eq!(store.take(&id).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = MemoryStore::new();
        let short = UuidV4Generator.generate();
        let long = UuidV4Generator.generate();
        store.put(&short, b"short", Expiration::OneHour).await.unwrap();
        store.put(&long, b"long", Expiration::OneWeek).await.unwrap();

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert!(store.get(&short).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get(&short).await.unwrap(), None);
        assert_eq!(store.take(&short).await.unwrap(), None);
        assert_eq!(store.get(&long).await.unwrap(), Some(b"long".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            let id = UuidV4Generator.generate();
            store.put(&id, b"x", Expiration::OneHour).await.unwrap();
        }
        let keep = UuidV4Generator.generate();
        store.put(&keep, b"y", Expiration::OneDay).await.unwrap();

        tokio::time::advance(Expiration::OneHour.as_duration()).await;
        assert_eq!(store.purge_expired(), 3);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_takes_deliver_once() {
        let store = MemoryStore::new();
        let id = UuidV4Generator.generate();
        store.put(&id, b"race", Expiration::OneHour).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.take(&id).await.unwrap() })
            })
            .collect();

        let mut hits = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                hits += 1;
            }
        }
        assert_eq!(hits, 1);
    }
}
