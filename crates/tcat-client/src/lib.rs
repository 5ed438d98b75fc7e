//! Interactive commissioning client for TCAT devices.
//!
//! Connects to a Thread border router or end device over a secure channel
//! and drives it with TLV commands: hello, commissioning, Thread start/stop,
//! reboot and Wi-Fi provisioning.
//!
//! # Crate Structure
//!
//! - [`tlv`]: TLV record codec
//! - [`transport`]: Device discovery and raw links (UDP simulation, BLE behind `ble`)
//! - [`session`]: Handshake-gated secure session
//! - [`engine`]: Command registry, execution context and the command loop
//! - [`cmd`]: The commands themselves

/// Re-export TLV types.
pub mod tlv {
    pub use tcat_tlv::*;
}

/// Re-export transport types.
pub mod transport {
    pub use tcat_transport::*;
}

/// Re-export session types.
pub mod session {
    pub use tcat_session::*;
}

pub mod cmd;
pub mod config;
pub mod console;
pub mod dataset;
pub mod engine;
pub mod output;
pub mod wifi;
