use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the canonical hyphenated form, e.g.
///  `3f2b8c1e-9d4a-4c2e-8f61-0b7a5e9d2c14`
const CANONICAL_LEN: usize = 36;

/// Opaque retrieval token for a stored secret.
///
/// Whoever holds the textual form of an id can redeem the secret
///  it names, so treat it as a bearer credential: don't log it at
///  levels that end up in shared sinks and don't put it in places
///  that outlive the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretId(Uuid);

impl SecretId {
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for SecretId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Only the canonical form is accepted: 8-4-4-4-12 groups of
///  lowercase hex. `uuid` itself is more lenient (braces, urn
///  prefix, uppercase, no hyphens), so the parsed value is rendered
///  back and compared.
impl FromStr for SecretId {
    type Err = MalformedSecretId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != CANONICAL_LEN {
            return Err(MalformedSecretId);
        }
        let uuid = Uuid::parse_str(s).map_err(|_| MalformedSecretId)?;
        let id = Self(uuid);
        if id.to_string() != s {
            return Err(MalformedSecretId);
        }
        Ok(id)
    }
}

impl TryFrom<String> for SecretId {
    type Error = MalformedSecretId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SecretId> for String {
    fn from(id: SecretId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("secret id is not a canonical lowercase uuid")]
pub struct MalformedSecretId;

/// Source of fresh secret ids.
///
/// Implementations must make collisions negligible over the lifetime
///  of the service; ids are never checked for prior use.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn generate(&self) -> SecretId;
}

/// Random (v4) uuids, 122 bits of entropy from the OS rng.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn generate(&self) -> SecretId {
        SecretId(Uuid::new_v4())
    }
}
