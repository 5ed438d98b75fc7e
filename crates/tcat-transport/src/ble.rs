//! Bluetooth LE link to TCAT devices.
//!
//! Devices advertise the TCAT service. The commissioner writes to the TX
//! characteristic and receives notifications on the RX characteristic; both
//! directions are bridged onto a [`BoxedStream`].

use std::pin::Pin;
use std::time::Duration;

use btleplug::api::{
    Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, ValueNotification,
    WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures_util::future::BoxFuture;
use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, TransportError};
use crate::traits::{BoxedStream, Connector, Discovery, PeerDescriptor};

/// TCAT GATT service (16-bit UUID 0xFFFB).
pub const TCAT_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000fffb_0000_1000_8000_00805f9b34fb);

/// Characteristic the commissioner writes to.
pub const TCAT_TX_CHAR_UUID: Uuid = Uuid::from_u128(0x6bd10d8b_85a7_4e5a_ba2d_c83558a5f220);

/// Characteristic the device notifies on.
pub const TCAT_RX_CHAR_UUID: Uuid = Uuid::from_u128(0x7fddf61f_280a_4773_b448_ba1b8fe0dd69);

type Notifications = Pin<Box<dyn Stream<Item = ValueNotification> + Send>>;

/// Configuration for the BLE link.
#[derive(Debug, Clone)]
pub struct BleConfig {
    /// How long discovery listens for advertisements.
    pub scan_duration: Duration,
    /// Largest single characteristic write (ATT MTU minus header).
    pub write_chunk: usize,
    /// Capacity of the in-memory pipe between the pump and the session.
    pub pipe_capacity: usize,
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            scan_duration: Duration::from_secs(10),
            write_chunk: 20,
            pipe_capacity: 64 * 1024,
        }
    }
}

/// Discovery and connect over the first local Bluetooth adapter.
pub struct BleLink {
    adapter: Adapter,
    config: BleConfig,
}

impl BleLink {
    /// Open the first Bluetooth adapter on this host.
    pub async fn new(config: BleConfig) -> Result<Self> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::NoAdapter("no Bluetooth adapter found".to_string()))?;
        Ok(Self { adapter, config })
    }

    async fn discover(&self) -> Result<Vec<PeerDescriptor>> {
        self.adapter
            .start_scan(ScanFilter {
                services: vec![TCAT_SERVICE_UUID],
            })
            .await?;
        tokio::time::sleep(self.config.scan_duration).await;

        let mut found = Vec::new();
        for peripheral in self.adapter.peripherals().await? {
            let Some(props) = peripheral.properties().await? else {
                continue;
            };
            if !props.services.contains(&TCAT_SERVICE_UUID) {
                continue;
            }
            found.push(PeerDescriptor {
                name: props.local_name.unwrap_or_else(|| "Unknown".to_string()),
                address: peripheral.address().to_string(),
                rssi: props.rssi,
            });
        }

        self.adapter.stop_scan().await?;
        info!(count = found.len(), "ble discovery finished");
        Ok(found)
    }

    async fn find(&self, address: &str) -> Result<Peripheral> {
        for peripheral in self.adapter.peripherals().await? {
            if peripheral.address().to_string() == address {
                return Ok(peripheral);
            }
        }
        Err(TransportError::InvalidAddress(address.to_string()))
    }

    async fn connect(&self, peer: &PeerDescriptor) -> Result<BoxedStream> {
        let peripheral = self.find(&peer.address).await?;
        peripheral.connect().await?;
        peripheral.discover_services().await?;

        let characteristics = peripheral.characteristics();
        let tx = find_characteristic(&characteristics, TCAT_TX_CHAR_UUID, &peer.address)?;
        let rx = find_characteristic(&characteristics, TCAT_RX_CHAR_UUID, &peer.address)?;

        peripheral.subscribe(&rx).await?;
        let notifications = peripheral.notifications().await?;
        info!(address = %peer.address, "ble link open");

        let (app, link) = tokio::io::duplex(self.config.pipe_capacity);
        tokio::spawn(pump(
            peripheral,
            tx,
            notifications,
            link,
            self.config.write_chunk.max(1),
        ));
        Ok(Box::new(app))
    }
}

impl Discovery for BleLink {
    fn scan(&self) -> BoxFuture<'_, Result<Vec<PeerDescriptor>>> {
        Box::pin(self.discover())
    }
}

impl Connector for BleLink {
    fn open<'a>(&'a self, peer: &'a PeerDescriptor) -> BoxFuture<'a, Result<BoxedStream>> {
        Box::pin(self.connect(peer))
    }
}

fn find_characteristic<'a>(
    characteristics: impl IntoIterator<Item = &'a Characteristic>,
    uuid: Uuid,
    address: &str,
) -> Result<Characteristic> {
    characteristics
        .into_iter()
        .find(|c| c.uuid == uuid)
        .cloned()
        .ok_or_else(|| TransportError::Connect {
            address: address.to_string(),
            reason: format!("characteristic {uuid} not found"),
        })
}

/// Moves bytes between GATT and the session's end of the pipe.
async fn pump(
    peripheral: Peripheral,
    tx: Characteristic,
    mut notifications: Notifications,
    mut link: DuplexStream,
    chunk: usize,
) {
    let mut outbound = vec![0u8; chunk];

    loop {
        tokio::select! {
            notification = notifications.next() => match notification {
                Some(n) if n.uuid == TCAT_RX_CHAR_UUID => {
                    debug!(bytes = n.value.len(), "ble notification");
                    if let Err(err) = link.write_all(&n.value).await {
                        debug!(%err, "session side gone");
                        break;
                    }
                }
                Some(_) => continue,
                None => {
                    info!("ble notifications ended");
                    break;
                }
            },
            read = link.read(&mut outbound) => match read {
                Ok(0) => {
                    debug!("session closed the stream");
                    break;
                }
                Ok(n) => {
                    if let Err(err) = peripheral.write(&tx, &outbound[..n], WriteType::WithResponse).await {
                        warn!(%err, "ble write failed");
                        break;
                    }
                }
                Err(err) => {
                    debug!(%err, "session pipe error");
                    break;
                }
            },
        }
    }

    if let Err(err) = peripheral.disconnect().await {
        debug!(%err, "ble disconnect failed");
    }
}
