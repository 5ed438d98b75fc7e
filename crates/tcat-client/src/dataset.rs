//! Active operational dataset sent by `commission`.

use std::fmt;

use bytes::Bytes;

/// MeshCoP TLVs of the built-in dataset: timestamp, channel 15, channel mask,
/// extended PAN ID, mesh-local prefix, network key, name `OpenThreadDemo`,
/// PAN ID 0x1234, PSKc and security policy.
const DEFAULT_DATASET_HEX: &str = concat!(
    "0e080000000000010000",
    "000300000f",
    "35060004001fffe0",
    "02081111111122222222",
    "0708fdad70bfe5aa15dd",
    "051000112233445566778899aabbccddeeff",
    "030e4f70656e54687265616444656d6f",
    "01021234",
    "0410445f2b5ca6f2a93a55ce570a70efeecb",
    "0c0402a0f7f8",
);

/// Largest dataset that still fits in a single TLV value.
pub const MAX_DATASET_LEN: usize = tcat_tlv::MAX_VALUE_LEN;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("invalid dataset hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("dataset is empty")]
    Empty,

    #[error("dataset is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },
}

/// Serialized Thread operational dataset, kept opaque.
#[derive(Clone, PartialEq, Eq)]
pub struct ActiveDataset {
    bytes: Bytes,
}

impl ActiveDataset {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self, DatasetError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(DatasetError::Empty);
        }
        if bytes.len() > MAX_DATASET_LEN {
            return Err(DatasetError::TooLarge {
                size: bytes.len(),
                max: MAX_DATASET_LEN,
            });
        }
        Ok(Self { bytes })
    }

    pub fn from_hex(text: &str) -> Result<Self, DatasetError> {
        Self::from_bytes(hex::decode(text.trim())?)
    }

    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for ActiveDataset {
    fn default() -> Self {
        let bytes = hex::decode(DEFAULT_DATASET_HEX).unwrap_or_default();
        Self {
            bytes: Bytes::from(bytes),
        }
    }
}

impl fmt::Debug for ActiveDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveDataset")
            .field("len", &self.bytes.len())
            .finish()
    }
}
