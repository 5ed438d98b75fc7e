//! Byte-stream links to TCAT devices.
//!
//! Provides a unified interface over the ways a commissioner reaches a device:
//! - Bluetooth LE GATT (behind the `ble` feature)
//! - UDP to a simulated node (always available)
//!
//! Every link ends up as a [`BoxedStream`]: an ordered, reliable byte stream
//! the secure session layers its TLS records on.

pub mod error;
pub mod traits;
pub mod udp;

#[cfg(feature = "ble")]
pub mod ble;

pub use error::{Result, TransportError};
pub use traits::{BoxedStream, ByteStream, Connector, Discovery, PeerDescriptor};
pub use udp::{UdpConfig, UdpLink, SIMULATION_BASE_PORT};

#[cfg(feature = "ble")]
pub use ble::{BleConfig, BleLink};
