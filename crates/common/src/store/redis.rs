use std::fmt;
use std::time::Duration;

use ::redis::aio::{ConnectionManager, ConnectionManagerConfig};
use ::redis::AsyncCommands;
use async_trait::async_trait;
use url::Url;

use super::{SecretStore, StoreError};
use crate::secret::{Expiration, SecretId};

/// Upper bound on establishing a connection to redis
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound on a single command round trip
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis backed store.
///
/// Payloads are written with `SET .. EX <ttl>` under the bare id, so
///  expiry is enforced by redis. Redemption uses `GETDEL` (redis 6.2+)
///  which makes concurrent takes of one id resolve to a single winner.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    endpoint: String,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the url can carry a password, only show where we point
        f.debug_struct("RedisStore")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl RedisStore {
    /// Connect eagerly; fails if the server can't be reached.
    ///
    /// Failures are never retried: a refused or timed out connection
    ///  is returned to the caller straight away. After a dropped
    ///  connection the manager reconnects on the next command.
    pub async fn connect(url: &Url) -> Result<Self, StoreError> {
        let client = ::redis::Client::open(url.as_str())?;
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(0)
            .set_connection_timeout(CONNECTION_TIMEOUT)
            .set_response_timeout(RESPONSE_TIMEOUT);
        let conn = ConnectionManager::new_with_config(client, config).await?;
        let endpoint = format!(
            "{}:{}",
            url.host_str().unwrap_or("localhost"),
            url.port().unwrap_or(6379)
        );
        tracing::info!(endpoint = %endpoint, "connected to redis");
        Ok(Self { conn, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SecretStore for RedisStore {
    async fn put(&self, id: &SecretId, payload: &[u8], ttl: Expiration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(id.to_string(), payload, ttl.as_secs()).await?;
        Ok(())
    }

    async fn get(&self, id: &SecretId) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let payload: Option<Vec<u8>> = conn.get(id.to_string()).await?;
        Ok(payload)
    }

    async fn delete(&self, id: &SecretId) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(id.to_string()).await?;
        Ok(removed > 0)
    }

    async fn take(&self, id: &SecretId) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let payload: Option<Vec<u8>> = conn.get_del(id.to_string()).await?;
        Ok(payload)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let pong: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        if pong != "PONG" {
            return Err(StoreError::Backend(format!("unexpected PING reply: {pong}")));
        }
        Ok(())
    }
}
