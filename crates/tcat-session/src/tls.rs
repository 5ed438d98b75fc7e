//! Credential loading and the TLS handshaker.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::{ClientConfig, RootCertStore};
use tcat_transport::BoxedStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::error::{Result, SessionError};

/// Commissioner certificate chain.
pub const COMMISSIONER_CERT_FILE: &str = "commissioner_cert.pem";
/// Commissioner private key.
pub const COMMISSIONER_KEY_FILE: &str = "commissioner_key.pem";
/// CA that signed the device certificate.
pub const CA_CERT_FILE: &str = "ca_cert.pem";

/// Turns a raw stream into an authenticated one.
///
/// `server_name` is the identity the peer must present.
pub trait Handshaker: Send + Sync {
    fn handshake<'a>(
        &'a self,
        stream: BoxedStream,
        server_name: &'a str,
    ) -> BoxFuture<'a, io::Result<BoxedStream>>;
}

/// Source of credential material for new sessions.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Handshaker>>;
}

/// Mutual TLS over `tokio-rustls` with the ring provider.
#[derive(Clone)]
pub struct TlsHandshaker {
    connector: TlsConnector,
}

impl TlsHandshaker {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            connector: TlsConnector::from(Arc::new(config)),
        }
    }

    /// Build a client config from PEM-encoded material.
    pub fn from_pem(cert_chain: &[u8], private_key: &[u8], ca_certs: &[u8]) -> Result<Self> {
        let chain = parse_certs(cert_chain, "certificate chain")?;
        let key = parse_key(private_key)?;

        let mut roots = RootCertStore::empty();
        for ca in parse_certs(ca_certs, "CA certificate")? {
            roots
                .add(ca)
                .map_err(|err| SessionError::Credentials(format!("CA certificate: {err}")))?;
        }

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|err| SessionError::Credentials(err.to_string()))?
            .with_root_certificates(roots)
            .with_client_auth_cert(chain, key)
            .map_err(|err| SessionError::Credentials(format!("client certificate: {err}")))?;

        Ok(Self::new(config))
    }
}

impl fmt::Debug for TlsHandshaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsHandshaker").finish_non_exhaustive()
    }
}

impl Handshaker for TlsHandshaker {
    fn handshake<'a>(
        &'a self,
        stream: BoxedStream,
        server_name: &'a str,
    ) -> BoxFuture<'a, io::Result<BoxedStream>> {
        Box::pin(async move {
            let name = ServerName::try_from(server_name.to_owned())
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
            let tls = self.connector.connect(name, stream).await?;
            debug!(server_name, "tls handshake complete");
            Ok(Box::new(tls) as BoxedStream)
        })
    }
}

fn parse_certs(pem: &[u8], what: &str) -> Result<Vec<CertificateDer<'static>>> {
    let certs = rustls_pemfile::certs(&mut &pem[..])
        .collect::<io::Result<Vec<_>>>()
        .map_err(|err| SessionError::Credentials(format!("{what}: {err}")))?;
    if certs.is_empty() {
        return Err(SessionError::Credentials(format!(
            "{what}: no certificates found"
        )));
    }
    Ok(certs)
}

fn parse_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>> {
    rustls_pemfile::private_key(&mut &pem[..])
        .map_err(|err| SessionError::Credentials(format!("private key: {err}")))?
        .ok_or_else(|| SessionError::Credentials("private key: no key found".to_string()))
}

/// Reads the commissioner PEM files from one directory.
#[derive(Debug, Clone)]
pub struct PemDirectory {
    dir: PathBuf,
}

impl PemDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(file);
        std::fs::read(&path)
            .map_err(|err| SessionError::Credentials(format!("{}: {err}", path.display())))
    }
}

impl CredentialStore for PemDirectory {
    fn load(&self) -> Result<Arc<dyn Handshaker>> {
        let cert = self.read(COMMISSIONER_CERT_FILE)?;
        let key = self.read(COMMISSIONER_KEY_FILE)?;
        let ca = self.read(CA_CERT_FILE)?;
        debug!(dir = %self.dir.display(), "loaded commissioner credentials");
        Ok(Arc::new(TlsHandshaker::from_pem(&cert, &key, &ca)?))
    }
}
