use std::net::SocketAddr;
use std::path::PathBuf;

use crate::service_config::TlsPaths;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // Certificate and key, plain listener when unset
    pub tls: Option<TlsPaths>,
    // Directory served at the root path
    pub public_dir: PathBuf,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, tls: Option<TlsPaths>, public_dir: PathBuf) -> Self {
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, tls={}, public_dir={}",
            listen_addr,
            tls.is_some(),
            public_dir.display()
        );
        Self {
            listen_addr,
            log_level: tracing::Level::INFO,
            tls,
            public_dir,
        }
    }
}
