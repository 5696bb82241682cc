//! The unit of storage and the rules a new secret has to satisfy.
//!
//! A [`Secret`] can only be built through [`Secret::new`], which
//!  enforces the issuance policy:
//! - the lifetime is one of the sanctioned [`Expiration`]s
//! - the payload is at most [`MAX_SECRET_BYTES`] bytes

mod expiration;
mod id;

pub use expiration::{Expiration, InvalidExpiration, InvalidExpirationLabel};
pub use id::{IdGenerator, MalformedSecretId, SecretId, UuidV4Generator};

/// Largest payload accepted on issuance, counted in bytes of the
///  utf-8 encoding (the same unit the store holds).
pub const MAX_SECRET_BYTES: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid expiration: {0}")]
    Expiration(#[from] InvalidExpiration),
    #[error("payload is {0} bytes, limit is {max}", max = MAX_SECRET_BYTES)]
    TooLong(usize),
}

/// A validated payload waiting for an id.
///
/// Payloads are immutable once accepted; there is no way to
///  change one after it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    payload: String,
    expiration: Expiration,
}

impl Secret {
    /// Validate a raw issuance request. The expiration is checked
    ///  before the length.
    pub fn new(payload: String, expiration_secs: i32) -> Result<Self, ValidationError> {
        let expiration = Expiration::try_from(expiration_secs)?;
        if payload.len() > MAX_SECRET_BYTES {
            return Err(ValidationError::TooLong(payload.len()));
        }
        Ok(Self {
            payload,
            expiration,
        })
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn expiration(&self) -> Expiration {
        self.expiration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_limit() {
        let payload = "a".repeat(MAX_SECRET_BYTES);
        for e in Expiration::ALL {
            let secret = Secret::new(payload.clone(), e.into()).unwrap();
            assert_eq!(secret.payload().len(), MAX_SECRET_BYTES);
            assert_eq!(secret.expiration(), e);
        }
        assert!(Secret::new(String::new(), 3600).is_ok());
    }

    #[test]
    fn test_rejects_over_limit() {
        let payload = "a".repeat(MAX_SECRET_BYTES + 1);
        assert_eq!(
            Secret::new(payload, 3600),
            Err(ValidationError::TooLong(MAX_SECRET_BYTES + 1))
        );
    }

    #[test]
    fn test_length_counts_bytes() {
        // 5000 two-byte characters fit, one more does not
        let payload = "é".repeat(MAX_SECRET_BYTES / 2);
        assert!(Secret::new(payload.clone(), 86400).is_ok());
        let payload = format!("{payload}é");
        assert!(matches!(
            Secret::new(payload, 86400),
            Err(ValidationError::TooLong(_))
        ));
    }

    #[test]
    fn test_expiration_checked_first() {
        let payload = "a".repeat(MAX_SECRET_BYTES + 1);
        assert_eq!(
            Secret::new(payload, 60),
            Err(ValidationError::Expiration(InvalidExpiration(60)))
        );
    }
}
