use crate::session::SessionState;

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Opening the raw link failed.
    #[error("transport error: {0}")]
    Transport(#[from] tcat_transport::TransportError),

    /// Read or write on the channel failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer sent bytes that do not delimit into records.
    #[error("record error: {0}")]
    Codec(#[from] tcat_tlv::CodecError),

    /// Credential material is missing or unusable.
    #[error("credentials: {0}")]
    Credentials(String),

    /// Negotiation with the peer failed or timed out.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// The channel is gone; open a new session.
    #[error("session closed")]
    SessionClosed,

    /// The operation is not valid in the current state.
    #[error("invalid session state: expected {expected}, found {actual}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },
}

impl From<tcat_tlv::TlvError> for SessionError {
    fn from(err: tcat_tlv::TlvError) -> Self {
        Self::Codec(err.into())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
