use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The closed set of lifetimes a secret may be stored for.
///
/// Values cross the wire as whole seconds; anything outside the set
///  is rejected by [`Expiration::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Expiration {
    OneHour,
    OneDay,
    OneWeek,
}

impl Expiration {
    pub const ALL: [Expiration; 3] = [Self::OneHour, Self::OneDay, Self::OneWeek];

    pub const fn as_secs(&self) -> u64 {
        match self {
            Self::OneHour => 60 * 60,
            Self::OneDay => 60 * 60 * 24,
            Self::OneWeek => 60 * 60 * 24 * 7,
        }
    }

    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.as_secs())
    }

    /// Whether `secs` names one of the sanctioned lifetimes.
    pub fn is_valid(secs: i32) -> bool {
        Self::try_from(secs).is_ok()
    }
}

impl TryFrom<i32> for Expiration {
    type Error = InvalidExpiration;

    fn try_from(secs: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_secs() == secs as u64 && secs > 0)
            .ok_or(InvalidExpiration(secs))
    }
}

impl From<Expiration> for i32 {
    fn from(e: Expiration) -> Self {
        e.as_secs() as i32
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneHour => write!(f, "1h"),
            Self::OneDay => write!(f, "1d"),
            Self::OneWeek => write!(f, "1w"),
        }
    }
}

/// Accepts the short forms shown by `Display` as well as raw seconds.
impl std::str::FromStr for Expiration {
    type Err = InvalidExpirationLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(Self::OneHour),
            "1d" => Ok(Self::OneDay),
            "1w" => Ok(Self::OneWeek),
            other => other
                .parse::<i32>()
                .ok()
                .and_then(|secs| Self::try_from(secs).ok())
                .ok_or_else(|| InvalidExpirationLabel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid expiration: {0} seconds")]
pub struct InvalidExpiration(pub i32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid expiration '{0}', expected one of 1h, 1d, 1w")]
pub struct InvalidExpirationLabel(pub String);
