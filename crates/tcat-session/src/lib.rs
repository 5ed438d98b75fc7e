//! Secure session layer for TCAT.
//!
//! A [`SecureSession`] wraps a raw device stream, runs a pluggable
//! [`Handshaker`] against the expected peer identity, and then exchanges
//! whole TLV records: `send`, `send_with_response` and streaming `recv`.

pub mod error;
pub mod session;
pub mod tls;

pub use error::{Result, SessionError};
pub use session::{SecureSession, SessionConfig, SessionState};
pub use tls::{
    CredentialStore, Handshaker, PemDirectory, TlsHandshaker, CA_CERT_FILE, COMMISSIONER_CERT_FILE,
    COMMISSIONER_KEY_FILE,
};
