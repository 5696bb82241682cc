//! Ephemeral, TTL-aware storage for secret payloads.
//!
//! The relay never owns durable state: every payload lives in a
//!  [`SecretStore`] under its id, with the store's native expiry set
//!  to the requested lifetime. Expiry is the store's job.
//!
//! ## Backends
//!
//! - **redis** ([`RedisStore`]) - `redis://` / `rediss://` urls,
//!   atomic redemption through `GETDEL`
//! - **memory** ([`MemoryStore`]) - `memory://`, process local, for
//!   tests and local development
//!
//! ## One-time reads
//!
//! Redemption goes through [`SecretStore::take`]. Backends with an
//!  atomic get-and-remove primitive override it. The provided
//!  default is a `get` followed by a best-effort `delete`: two
//!  concurrent takes can both observe the value, and if the delete
//!  fails the payload stays readable until its ttl runs out. Such a
//!  backend only guarantees the secret is delivered at least once.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::secret::{Expiration, SecretId};

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("unsupported store url scheme '{0}', expected redis, rediss or memory")]
    UnsupportedScheme(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait SecretStore: Send + Sync + Debug {
    /// Write `payload` under `id`, readable for at most `ttl`.
    ///  Overwrites anything already stored under the id.
    async fn put(&self, id: &SecretId, payload: &[u8], ttl: Expiration) -> Result<(), StoreError>;

    /// Read the payload stored under `id`.
    ///
    /// # Returns
    /// * `Ok(Some(payload))` - the id is stored and not yet expired
    /// * `Ok(None)` - miss, either never stored, already taken or expired
    async fn get(&self, id: &SecretId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove `id`. Returns whether anything was removed.
    async fn delete(&self, id: &SecretId) -> Result<bool, StoreError>;

    /// Read and remove the payload stored under `id`.
    ///
    /// A failed delete after a successful read is logged and does not
    ///  fail the take; the caller already holds the payload.
    async fn take(&self, id: &SecretId) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(payload) = self.get(id).await? else {
            return Ok(None);
        };
        if let Err(e) = self.delete(id).await {
            tracing::error!(error = %e, "failed to delete secret after read, it stays readable until expiry");
        }
        Ok(Some(payload))
    }

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

pub type DynSecretStore = Arc<dyn SecretStore>;

/// Build the store named by `url`.
pub async fn connect(url: &Url) -> Result<DynSecretStore, StoreError> {
    match url.scheme() {
        "redis" | "rediss" => Ok(Arc::new(RedisStore::connect(url).await?)),
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => Err(StoreError::UnsupportedScheme(other.to_string())),
    }
}
