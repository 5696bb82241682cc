use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Args;

use relay_daemon::http_server::HttpServerError;
use relay_daemon::service_config::{parse_store_url, ConfigError, TlsPaths, DEFAULT_PORT};
use relay_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Where secrets are kept: redis://, rediss:// or memory://
    #[arg(long, env = "REDIS_URL")]
    pub store_url: Option<String>,

    /// Port to listen on
    #[arg(long, env = "RELAY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// PEM certificate chain, TLS is enabled when set together with --tls-key
    #[arg(long, env = "TLS_CERT")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key for --tls-cert
    #[arg(long, env = "TLS_KEY")]
    pub tls_key: Option<PathBuf>,

    /// Directory holding the browser UI
    #[arg(long, env = "RELAY_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long, env = "RELAY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Default log level, RUST_LOG takes precedence
    #[arg(long, default_value_t = tracing::Level::INFO)]
    pub log_level: tracing::Level,
}

impl Daemon {
    /// Assemble the service config, failing before anything is bound.
    pub fn service_config(&self) -> Result<ServiceConfig, ConfigError> {
        let store_url = parse_store_url(self.store_url.as_deref())?;

        let mut config = ServiceConfig::new(store_url);
        config.listen_addr = SocketAddr::new(self.bind, self.port);
        config.tls = TlsPaths::from_pair(self.tls_cert.clone(), self.tls_key.clone());
        config.public_dir = self.public_dir.clone();
        config.log_dir = self.log_dir.clone();
        config.log_level = self.log_level;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("relay stopped unexpectedly: {0}")]
    Server(#[from] HttpServerError),
}

impl crate::cli::op::ExitCode for DaemonError {
    fn exit_code(&self) -> i32 {
        match self {
            DaemonError::Config(_) => 2,
            DaemonError::Server(_) => 5,
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = self.service_config()?;
        spawn_service(&config).await?;
        Ok("relay stopped".to_string())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        daemon: Daemon,
    }

    fn parse(args: &[&str]) -> Daemon {
        let mut argv = vec!["relay"];
        argv.extend_from_slice(args);
        Wrapper::try_parse_from(argv).unwrap().daemon
    }

    #[test]
    fn test_defaults_with_memory_store() {
        let config = parse(&["--store-url", "memory://"])
            .service_config()
            .unwrap();
        assert_eq!(config.store_url.scheme(), "memory");
        assert_eq!(config.listen_addr.port(), DEFAULT_PORT);
        assert!(config.tls.is_none());
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_tls_pair_and_port() {
        let config = parse(&[
            "--store-url",
            "redis://localhost:6379",
            "--port",
            "8443",
            "--bind",
            "127.0.0.1",
            "--tls-cert",
            "cert.pem",
            "--tls-key",
            "key.pem",
        ])
        .service_config()
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8443".parse().unwrap());
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: "cert.pem".into(),
                key: "key.pem".into()
            })
        );
    }

    #[test]
    fn test_rejects_unknown_store() {
        let err = parse(&["--store-url", "memcached://localhost:11211"])
            .service_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedStore(_)));
        assert_eq!(crate::cli::op::ExitCode::exit_code(&DaemonError::from(err)), 2);
    }

    #[test]
    fn test_server_failure_exit_code() {
        let err = DaemonError::from(HttpServerError::ServingFailed(std::io::Error::from(
            std::io::ErrorKind::AddrInUse,
        )));
        assert_eq!(crate::cli::op::ExitCode::exit_code(&err), 5);
    }
}
