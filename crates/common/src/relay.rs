//! The redemption contract.
//!
//! [`Relay`] is the only thing that writes to or reads from the
//!  store on behalf of callers:
//! - **issue**: validate, mint an id, store the payload with its ttl
//! - **redeem**: validate the id, take the payload out of the store
//!
//! A secret moves `absent -> stored -> absent`. Once taken (or
//!  expired) its id never names anything again; storing new content
//!  always mints a new id.

use std::sync::Arc;

use crate::secret::{IdGenerator, Secret, SecretId, UuidV4Generator, ValidationError};
use crate::store::{DynSecretStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid secret: {0}")]
    Validation(#[from] ValidationError),
    #[error("malformed secret id")]
    MalformedId,
    #[error("secret not found")]
    NotFound,
    #[error("failed to write secret: {0}")]
    Write(#[source] StoreError),
    #[error("failed to read secret: {0}")]
    Read(#[source] StoreError),
}

/// Issues and redeems secrets against an injected store.
///
/// Cheap to clone; clones share the store and id generator.
#[derive(Debug, Clone)]
pub struct Relay {
    store: DynSecretStore,
    ids: Arc<dyn IdGenerator>,
}

impl Relay {
    pub fn new(store: DynSecretStore) -> Self {
        Self::with_id_generator(store, Arc::new(UuidV4Generator))
    }

    pub fn with_id_generator(store: DynSecretStore, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    pub fn store(&self) -> &DynSecretStore {
        &self.store
    }

    /// Validate and store a payload, returning the id that redeems it.
    ///
    /// Nothing is written if validation fails. If the write fails no
    ///  id is handed out.
    pub async fn issue(&self, payload: String, expiration_secs: i32) -> Result<SecretId, RelayError> {
        let secret = Secret::new(payload, expiration_secs)?;
        let id = self.ids.generate();

        self.store
            .put(&id, secret.payload().as_bytes(), secret.expiration())
            .await
            .map_err(RelayError::Write)?;

        tracing::debug!(ttl = %secret.expiration(), bytes = secret.payload().len(), "secret stored");
        Ok(id)
    }

    /// Hand out the payload named by `raw_id` and remove it.
    ///
    /// Malformed ids are rejected before the store is touched.
    pub async fn redeem(&self, raw_id: &str) -> Result<String, RelayError> {
        let id: SecretId = raw_id.parse().map_err(|_| RelayError::MalformedId)?;

        let payload = self
            .store
            .take(&id)
            .await
            .map_err(RelayError::Read)?
            .ok_or(RelayError::NotFound)?;

        tracing::debug!(bytes = payload.len(), "secret redeemed");
        // issued payloads are always utf-8, anything else was written
        //  by someone sharing the keyspace
        Ok(String::from_utf8(payload)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }
}
