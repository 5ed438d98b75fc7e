//! Known TCAT type tags and status codes.
//!
//! Tags are carried as raw `u8` on the wire; these enums only name the
//! ones this client knows about.

/// TCAT TLV type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TlvType {
    ResponseWithStatus = 0x01,
    ResponseWithPayload = 0x02,
    ResponseEvent = 0x03,
    GetNetworkName = 0x08,
    Disconnect = 0x09,
    Ping = 0x0A,
    GetDeviceId = 0x0B,
    GetExtPanId = 0x0C,
    GetProvisioningUrl = 0x0D,
    PresentPskdHash = 0x10,
    PresentPskcHash = 0x11,
    PresentInstallCodeHash = 0x12,
    RequestRandomNumChallenge = 0x13,
    RequestPskdHash = 0x14,
    /// Active operational dataset to commission.
    ActiveDataset = 0x20,
    ThreadStart = 0x27,
    ThreadStop = 0x28,
    Decommission = 0x60,
    /// Vendor application layer; carries ASCII commands such as `wifi_scan`.
    Application = 0x82,
}

impl TlvType {
    /// Every known tag, in numeric order.
    pub const ALL: [TlvType; 19] = [
        TlvType::ResponseWithStatus,
        TlvType::ResponseWithPayload,
        TlvType::ResponseEvent,
        TlvType::GetNetworkName,
        TlvType::Disconnect,
        TlvType::Ping,
        TlvType::GetDeviceId,
        TlvType::GetExtPanId,
        TlvType::GetProvisioningUrl,
        TlvType::PresentPskdHash,
        TlvType::PresentPskcHash,
        TlvType::PresentInstallCodeHash,
        TlvType::RequestRandomNumChallenge,
        TlvType::RequestPskdHash,
        TlvType::ActiveDataset,
        TlvType::ThreadStart,
        TlvType::ThreadStop,
        TlvType::Decommission,
        TlvType::Application,
    ];

    /// Upper-snake name as used in device logs.
    pub fn name(self) -> &'static str {
        match self {
            TlvType::ResponseWithStatus => "RESPONSE_W_STATUS",
            TlvType::ResponseWithPayload => "RESPONSE_W_PAYLOAD",
            TlvType::ResponseEvent => "RESPONSE_EVENT",
            TlvType::GetNetworkName => "GET_NETWORK_NAME",
            TlvType::Disconnect => "DISCONNECT",
            TlvType::Ping => "PING",
            TlvType::GetDeviceId => "GET_DEVICE_ID",
            TlvType::GetExtPanId => "GET_EXT_PAN_ID",
            TlvType::GetProvisioningUrl => "GET_PROVISIONING_URL",
            TlvType::PresentPskdHash => "PRESENT_PSKD_HASH",
            TlvType::PresentPskcHash => "PRESENT_PSKC_HASH",
            TlvType::PresentInstallCodeHash => "PRESENT_INSTALL_CODE_HASH",
            TlvType::RequestRandomNumChallenge => "REQUEST_RANDOM_NUM_CHALLENGE",
            TlvType::RequestPskdHash => "REQUEST_PSKD_HASH",
            TlvType::ActiveDataset => "ACTIVE_DATASET",
            TlvType::ThreadStart => "THREAD_START",
            TlvType::ThreadStop => "THREAD_STOP",
            TlvType::Decommission => "DECOMMISSION",
            TlvType::Application => "APPLICATION",
        }
    }
}

impl From<TlvType> for u8 {
    fn from(value: TlvType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for TlvType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TlvType::ALL
            .into_iter()
            .find(|ty| *ty as u8 == value)
            .ok_or(value)
    }
}

/// Returns a human-readable name for a raw type tag.
pub fn type_name(tag: u8) -> &'static str {
    match TlvType::try_from(tag) {
        Ok(ty) => ty.name(),
        Err(_) => "UNKNOWN",
    }
}

/// Status carried in a `ResponseWithStatus` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StatusCode {
    Success = 0,
    Unsupported = 1,
    ParseError = 2,
    ValueError = 3,
    GeneralError = 4,
    Busy = 5,
    Undefined = 6,
    HashError = 7,
    Unauthorized = 16,
}

impl StatusCode {
    pub fn name(self) -> &'static str {
        match self {
            StatusCode::Success => "SUCCESS",
            StatusCode::Unsupported => "UNSUPPORTED",
            StatusCode::ParseError => "PARSE_ERROR",
            StatusCode::ValueError => "VALUE_ERROR",
            StatusCode::GeneralError => "GENERAL_ERROR",
            StatusCode::Busy => "BUSY",
            StatusCode::Undefined => "UNDEFINED",
            StatusCode::HashError => "HASH_ERROR",
            StatusCode::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StatusCode::Success),
            1 => Ok(StatusCode::Unsupported),
            2 => Ok(StatusCode::ParseError),
            3 => Ok(StatusCode::ValueError),
            4 => Ok(StatusCode::GeneralError),
            5 => Ok(StatusCode::Busy),
            6 => Ok(StatusCode::Undefined),
            7 => Ok(StatusCode::HashError),
            16 => Ok(StatusCode::Unauthorized),
            other => Err(other),
        }
    }
}
