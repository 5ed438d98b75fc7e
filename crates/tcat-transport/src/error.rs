/// Errors that can occur while discovering or opening a device link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No usable radio/adapter on this host.
    #[error("no transport adapter available: {0}")]
    NoAdapter(String),

    /// Discovery could not complete.
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// Failed to open a link to the selected peer.
    #[error("failed to connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    /// The peer address could not be understood by this link.
    #[error("invalid peer address '{0}'")]
    InvalidAddress(String),

    /// An I/O error occurred on the link.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bluetooth stack error.
    #[cfg(feature = "ble")]
    #[error("bluetooth error: {0}")]
    Ble(#[from] btleplug::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
