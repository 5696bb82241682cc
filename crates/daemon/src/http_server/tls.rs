//! rustls configuration for the TLS listener.
//!
//! Only AEAD suites with forward secrecy are offered and nothing
//!  older than TLS 1.2 is negotiated.

use std::path::PathBuf;
use std::sync::Arc;

use rustls::crypto::{ring, CryptoProvider};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ServerConfig, SupportedCipherSuite};

use crate::service_config::TlsPaths;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read certificate chain from {0}: {1}")]
    Certificate(PathBuf, rustls::pki_types::pem::Error),
    #[error("no certificates found in {0}")]
    NoCertificates(PathBuf),
    #[error("failed to read private key from {0}: {1}")]
    PrivateKey(PathBuf, rustls::pki_types::pem::Error),
    #[error("invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

fn cipher_suites() -> Vec<SupportedCipherSuite> {
    use ring::cipher_suite::*;

    vec![
        TLS13_AES_256_GCM_SHA384,
        TLS13_AES_128_GCM_SHA256,
        TLS13_CHACHA20_POLY1305_SHA256,
        TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
        TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
        TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
        TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
        TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
        TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
    ]
}

/// Load the certificate chain and key named by `paths` into a
///  server config restricted to [`cipher_suites`].
pub fn server_config(paths: &TlsPaths) -> Result<Arc<ServerConfig>, TlsError> {
    let certs = CertificateDer::pem_file_iter(&paths.cert)
        .and_then(|iter| iter.collect::<Result<Vec<_>, _>>())
        .map_err(|e| TlsError::Certificate(paths.cert.clone(), e))?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(paths.cert.clone()));
    }

    let key = PrivateKeyDer::from_pem_file(&paths.key)
        .map_err(|e| TlsError::PrivateKey(paths.key.clone(), e))?;

    let provider = CryptoProvider {
        cipher_suites: cipher_suites(),
        ..ring::default_provider()
    };

    let mut config = ServerConfig::builder_with_provider(Arc::new(provider))
        .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    tracing::info!(cert = %paths.cert.display(), "loaded TLS certificate");
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_loads_fixture_pair() {
        let config = server_config(&TlsPaths {
            cert: fixture("localhost.crt"),
            key: fixture("localhost.key"),
        })
        .unwrap();

        let suites = &config.crypto_provider().cipher_suites;
        assert_eq!(suites.len(), 9);
        assert!(suites
            .iter()
            .all(|s| !format!("{:?}", s.suite()).contains("CBC")));
    }

    #[test]
    fn test_missing_certificate() {
        let err = server_config(&TlsPaths {
            cert: fixture("missing.crt"),
            key: fixture("localhost.key"),
        })
        .unwrap_err();
        assert!(matches!(err, TlsError::Certificate(..)));
    }

    #[test]
    fn test_empty_certificate_file() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("empty.crt");
        std::fs::write(&cert, "").unwrap();

        let err = server_config(&TlsPaths {
            cert,
            key: fixture("localhost.key"),
        })
        .unwrap_err();
        assert!(matches!(err, TlsError::NoCertificates(_)));
    }

    #[test]
    fn test_key_file_without_key() {
        // a certificate is not a private key
        let err = server_config(&TlsPaths {
            cert: fixture("localhost.crt"),
            key: fixture("localhost.crt"),
        })
        .unwrap_err();
        assert!(matches!(err, TlsError::PrivateKey(..)));
    }
}
