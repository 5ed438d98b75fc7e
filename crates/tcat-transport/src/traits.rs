use std::fmt;

use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

/// A connected, ordered byte stream to a device.
///
/// Blanket-implemented for anything that is `AsyncRead + AsyncWrite`, so TLS
/// streams, in-memory duplex pipes and bridged radio links are interchangeable.
pub trait ByteStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> ByteStream for T {}

/// Owned, type-erased byte stream.
pub type BoxedStream = Box<dyn ByteStream>;

/// A device found by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerDescriptor {
    /// Advertised name.
    pub name: String,
    /// Link-specific address (BD address, `host:port`, ...).
    pub address: String,
    /// Signal strength at discovery time, if the link reports one.
    pub rssi: Option<i16>,
}

impl fmt::Display for PeerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)?;
        if let Some(rssi) = self.rssi {
            write!(f, " rssi={rssi}")?;
        }
        Ok(())
    }
}

/// Finds devices that can be commissioned.
pub trait Discovery: Send + Sync {
    fn scan(&self) -> BoxFuture<'_, Result<Vec<PeerDescriptor>>>;
}

/// Opens a raw byte stream to a discovered device.
pub trait Connector: Send + Sync {
    fn open<'a>(&'a self, peer: &'a PeerDescriptor) -> BoxFuture<'a, Result<BoxedStream>>;
}
