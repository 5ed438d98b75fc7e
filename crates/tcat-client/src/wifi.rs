//! Text conventions of the TBR Wi-Fi application commands.
//!
//! Requests are space-delimited ASCII. Answers are either a sentinel
//! (`RESP_OK`, `RESP_FAIL`, `RESP_NOT_SUPP`, matched by containment) or a
//! pipe-delimited record.

use std::fmt;
use std::str::FromStr;

use tcat_tlv::Tlv;
use tracing::warn;

pub const RESP_OK: &str = "RESP_OK";
pub const RESP_FAIL: &str = "RESP_FAIL";
pub const RESP_NOT_SUPP: &str = "RESP_NOT_SUPP";

pub const CMD_WIFI_SCAN: &str = "wifi_scan";
pub const CMD_WIFI_STATUS: &str = "wifi_status";
pub const CMD_WIFI_ADD: &str = "wifi_add";

/// State reported for a connected station.
pub const STATE_COMPLETED: &str = "COMPLETED";

/// How a device answer is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    NotSupported,
    Failed,
    Ok,
    Data,
}

impl Reply {
    pub fn classify(text: &str) -> Self {
        if text.contains(RESP_NOT_SUPP) {
            Self::NotSupported
        } else if text.contains(RESP_FAIL) {
            Self::Failed
        } else if text.contains(RESP_OK) {
            Self::Ok
        } else {
            Self::Data
        }
    }

    pub fn of(tlv: &Tlv) -> Self {
        Self::classify(&tlv.text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected at least {expected} '|' separated fields, found {found}")]
pub struct RecordError {
    pub expected: usize,
    pub found: usize,
}

/// One access point from a `wifi_scan` answer: `id|ssid|chan|band|rssi|security`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRecord {
    pub id: String,
    pub ssid: String,
    pub channel: String,
    pub band: String,
    pub rssi: String,
    pub security: String,
}

impl NetworkRecord {
    pub const FIELDS: usize = 6;

    /// The `wifi_add` request that stores this network.
    pub fn add_command(&self, password: &str) -> String {
        format!("{CMD_WIFI_ADD} {} {password} {}", self.ssid, self.security)
    }
}

impl FromStr for NetworkRecord {
    type Err = RecordError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = text.split('|').collect();
        if fields.len() < Self::FIELDS {
            return Err(RecordError {
                expected: Self::FIELDS,
                found: fields.len(),
            });
        }
        if fields.len() > Self::FIELDS {
            warn!(extra = fields.len() - Self::FIELDS, "ignoring extra network fields");
        }
        Ok(Self {
            id: fields[0].to_string(),
            ssid: fields[1].to_string(),
            channel: fields[2].to_string(),
            band: fields[3].to_string(),
            rssi: fields[4].to_string(),
            security: fields[5].to_string(),
        })
    }
}

/// Station status from a `wifi_status` answer: `state|ssid|rssi`.
///
/// Only the state is mandatory; a disconnected station reports it alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiStatus {
    pub state: String,
    pub ssid: Option<String>,
    pub rssi: Option<String>,
}

impl WifiStatus {
    pub fn is_connected(&self) -> bool {
        self.state == STATE_COMPLETED
    }
}

impl FromStr for WifiStatus {
    type Err = RecordError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut fields = text.split('|');
        let state = fields.next().unwrap_or_default().trim();
        if state.is_empty() {
            return Err(RecordError {
                expected: 1,
                found: 0,
            });
        }
        Ok(Self {
            state: state.to_string(),
            ssid: fields.next().map(str::to_string),
            rssi: fields.next().map(str::to_string),
        })
    }
}

impl fmt::Display for WifiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_connected() {
            write!(
                f,
                "Wi-Fi connected to: \"{}\" [RSSI: {}]",
                self.ssid.as_deref().unwrap_or_default(),
                self.rssi.as_deref().unwrap_or_default()
            )
        } else {
            write!(f, "Wi-Fi {}", self.state.to_lowercase())
        }
    }
}

/// Records gathered from one streamed `wifi_scan` batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanBatch {
    pub networks: Vec<NetworkRecord>,
    /// The device reported `RESP_FAIL` part way through.
    pub failed: bool,
}

/// Collect networks in arrival order until `RESP_OK` or `RESP_FAIL`.
pub fn collect_networks(frames: &[Tlv]) -> ScanBatch {
    let mut batch = ScanBatch::default();
    for frame in frames {
        let text = frame.text();
        match Reply::classify(&text) {
            Reply::Failed => {
                batch.failed = true;
                break;
            }
            Reply::Ok => break,
            Reply::NotSupported | Reply::Data => match text.parse::<NetworkRecord>() {
                Ok(network) => batch.networks.push(network),
                Err(err) => warn!(%err, record = %text, "skipping malformed network record"),
            },
        }
    }
    batch
}

/// Result of one streamed `wifi_status` batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusBatch {
    /// Last status record seen before a sentinel.
    pub status: Option<WifiStatus>,
    /// Sentinel that ended the batch, if any.
    pub terminator: Option<Reply>,
}

pub fn collect_status(frames: &[Tlv]) -> StatusBatch {
    let mut batch = StatusBatch::default();
    for frame in frames {
        let text = frame.text();
        match Reply::classify(&text) {
            Reply::Data => match text.parse::<WifiStatus>() {
                Ok(status) => batch.status = Some(status),
                Err(err) => warn!(%err, record = %text, "skipping malformed status record"),
            },
            sentinel => {
                batch.terminator = Some(sentinel);
                break;
            }
        }
    }
    batch
}
