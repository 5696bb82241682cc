/**
 * Issuance and one-time redemption of secrets.
 *  The only component that talks to the store
 *  on behalf of callers.
 */
pub mod relay;
/**
 * The secret model: ids, lifetimes and the
 *  validation rules for new payloads.
 */
pub mod secret;
/**
 * TTL-aware ephemeral stores (redis, memory)
 *  behind a single trait.
 */
pub mod store;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::relay::{Relay, RelayError};
    pub use crate::secret::{
        Expiration, IdGenerator, InvalidExpiration, MalformedSecretId, Secret, SecretId,
        UuidV4Generator, ValidationError, MAX_SECRET_BYTES,
    };
    pub use crate::store::{DynSecretStore, MemoryStore, RedisStore, SecretStore, StoreError};
    pub use crate::version::build_info;
}
