//! Shared fixtures for relay contract tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ::common::prelude::*;
use uuid::Uuid;

/// Hands out predictable ids: `00000000-0000-4000-8000-<counter>`
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> SecretId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        let uuid = Uuid::parse_str(&format!("00000000-0000-4000-8000-{:012x}", n))
            .expect("sequential id is a valid uuid");
        SecretId::from(uuid)
    }
}

/// A relay over a fresh in-memory store, with a handle on the store
pub fn setup_relay() -> (Relay, MemoryStore) {
    let store = MemoryStore::new();
    let relay = Relay::new(Arc::new(store.clone()));
    (relay, store)
}

/// Same as [`setup_relay`] but with predictable ids
pub fn setup_sequential_relay() -> (Relay, MemoryStore) {
    let store = MemoryStore::new();
    let relay = Relay::with_id_generator(
        Arc::new(store.clone()),
        Arc::new(SequentialIds::default()),
    );
    (relay, store)
}
