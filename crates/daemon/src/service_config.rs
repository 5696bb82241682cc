use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use url::Url;

/// Port the relay listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 1337;

#[derive(Debug, Clone)]
pub struct Config {
    // store configuration
    /// where secrets are kept, `redis://`, `rediss://` or `memory://`
    pub store_url: Url,

    // http server configuration
    /// address the relay listens on
    pub listen_addr: SocketAddr,
    /// certificate and key for the TLS listener,
    ///  if not set a plain listener is used
    pub tls: Option<TlsPaths>,
    /// directory holding the browser UI, served at `/`
    pub public_dir: PathBuf,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Defaults for everything except the store, which has no
    ///  sensible default.
    pub fn new(store_url: Url) -> Self {
        Self {
            store_url,
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            tls: None,
            public_dir: PathBuf::from("public"),
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsPaths {
    /// TLS is only enabled when both halves are configured.
    pub fn from_pair(cert: Option<PathBuf>, key: Option<PathBuf>) -> Option<Self> {
        match (cert, key) {
            (Some(cert), Some(key)) => Some(Self { cert, key }),
            (None, None) => None,
            (cert, key) => {
                tracing::warn!(
                    cert = ?cert,
                    key = ?key,
                    "only one of the TLS certificate and key is set, serving plain HTTP"
                );
                None
            }
        }
    }
}

/// Resolve the store address; the relay can't run without one.
pub fn parse_store_url(raw: Option<&str>) -> Result<Url, ConfigError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingStoreUrl)?;
    let url = Url::parse(raw)?;
    match url.scheme() {
        "redis" | "rediss" | "memory" => Ok(url),
        other => Err(ConfigError::UnsupportedStore(other.to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("a store address must be specified (--store-url or REDIS_URL)")]
    MissingStoreUrl,
    #[error("invalid store address: {0}")]
    InvalidStoreUrl(#[from] url::ParseError),
    #[error("unsupported store '{0}', expected redis, rediss or memory")]
    UnsupportedStore(String),
}
