use std::sync::Arc;

use common::prelude::{DynSecretStore, MemoryStore, Relay, StoreError};
use common::store;

use crate::ServiceConfig;

/// Main service state, shared by every request handler.
///
/// Holds no mutable state of its own; everything durable lives in
///  the store behind the relay.
#[derive(Clone, Debug)]
pub struct State {
    relay: Relay,
    /// set when secrets are kept in process and need sweeping
    memory_store: Option<MemoryStore>,
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        tracing::info!(
            scheme = config.store_url.scheme(),
            host = ?config.store_url.host_str(),
            "connecting to secret store"
        );

        if config.store_url.scheme() == "memory" {
            tracing::warn!("secrets are kept in process memory and lost on restart");
            return Ok(Self::from_memory_store(MemoryStore::new()));
        }

        let store = store::connect(&config.store_url).await?;
        store.ping().await?;
        Ok(Self::from_store(store))
    }

    /// Build state around an already constructed store.
    pub fn from_store(store: DynSecretStore) -> Self {
        Self {
            relay: Relay::new(store),
            memory_store: None,
        }
    }

    pub fn from_memory_store(store: MemoryStore) -> Self {
        Self {
            relay: Relay::new(Arc::new(store.clone())),
            memory_store: Some(store),
        }
    }

    pub fn from_relay(relay: Relay) -> Self {
        Self {
            relay,
            memory_store: None,
        }
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    pub fn store(&self) -> &DynSecretStore {
        self.relay.store()
    }

    pub fn memory_store(&self) -> Option<&MemoryStore> {
        self.memory_store.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Secret store setup error: {0}")]
    Store(#[from] StoreError),
}
