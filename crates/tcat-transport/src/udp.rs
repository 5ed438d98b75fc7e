//! UDP link to a simulated TCAT node.
//!
//! A simulated node listens on `host:SIMULATION_BASE_PORT + node_id` and
//! treats every datagram as a chunk of its TLS byte stream. The link bridges
//! those datagrams onto a [`BoxedStream`] with a background pump task.

use std::net::SocketAddr;

use futures_util::future::BoxFuture;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::traits::{BoxedStream, Connector, Discovery, PeerDescriptor};

/// First port used by simulated nodes; node `n` listens on `BASE + n`.
pub const SIMULATION_BASE_PORT: u16 = 10000;

const MAX_DATAGRAM: usize = 64 * 1024;

/// Configuration for the UDP simulation link.
#[derive(Debug, Clone)]
pub struct UdpConfig {
    /// Host the simulation runs on.
    pub host: String,
    /// Simulated node id.
    pub node_id: u16,
    /// Largest datagram written towards the node.
    pub max_write: usize,
    /// Capacity of the in-memory pipe between the pump and the session.
    pub pipe_capacity: usize,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            node_id: 1,
            max_write: 1024,
            pipe_capacity: 64 * 1024,
        }
    }
}

impl UdpConfig {
    /// `host:port` of the configured node.
    pub fn node_address(&self) -> String {
        format!(
            "{}:{}",
            self.host,
            SIMULATION_BASE_PORT.saturating_add(self.node_id)
        )
    }
}

/// Discovery and connect over UDP to a simulated node.
#[derive(Debug, Clone, Default)]
pub struct UdpLink {
    config: UdpConfig,
}

impl UdpLink {
    pub fn new(config: UdpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UdpConfig {
        &self.config
    }

    async fn connect(&self, address: &str) -> Result<BoxedStream> {
        let target = tokio::net::lookup_host(address)
            .await
            .map_err(|err| TransportError::Connect {
                address: address.to_string(),
                reason: err.to_string(),
            })?
            .next()
            .ok_or_else(|| TransportError::InvalidAddress(address.to_string()))?;

        let local: SocketAddr = if target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local).await?;
        socket
            .connect(target)
            .await
            .map_err(|err| TransportError::Connect {
                address: address.to_string(),
                reason: err.to_string(),
            })?;
        info!(%target, "udp link open");

        let (app, link) = tokio::io::duplex(self.config.pipe_capacity);
        tokio::spawn(pump(socket, link, self.config.max_write.max(1)));
        Ok(Box::new(app))
    }
}

impl Discovery for UdpLink {
    fn scan(&self) -> BoxFuture<'_, Result<Vec<PeerDescriptor>>> {
        Box::pin(async move {
            let peer = PeerDescriptor {
                name: format!("Simulated node {}", self.config.node_id),
                address: self.config.node_address(),
                rssi: None,
            };
            debug!(%peer, "simulation discovery");
            Ok(vec![peer])
        })
    }
}

impl Connector for UdpLink {
    fn open<'a>(&'a self, peer: &'a PeerDescriptor) -> BoxFuture<'a, Result<BoxedStream>> {
        Box::pin(self.connect(&peer.address))
    }
}

/// Moves bytes between the socket and the session's end of the pipe.
///
/// Ends when either side closes; dropping `link` then signals end-of-stream
/// to the session.
async fn pump(socket: UdpSocket, mut link: DuplexStream, max_write: usize) {
    let mut inbound = vec![0u8; MAX_DATAGRAM];
    let mut outbound = vec![0u8; max_write];

    loop {
        tokio::select! {
            received = socket.recv(&mut inbound) => match received {
                Ok(n) => {
                    debug!(bytes = n, "udp datagram in");
                    if let Err(err) = link.write_all(&inbound[..n]).await {
                        debug!(%err, "session side gone");
                        break;
                    }
                }
                Err(err) => {
                    warn!(%err, "udp receive failed");
                    break;
                }
            },
            read = link.read(&mut outbound) => match read {
                Ok(0) => {
                    debug!("session closed the stream");
                    break;
                }
                Ok(n) => {
                    if let Err(err) = socket.send(&outbound[..n]).await {
                        warn!(%err, "udp send failed");
                        break;
                    }
                    debug!(bytes = n, "udp datagram out");
                }
                Err(err) => {
                    debug!(%err, "session pipe error");
                    break;
                }
            },
        }
    }
}
