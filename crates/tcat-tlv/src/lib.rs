//! Type-length-value records for the TCAT commissioning protocol.
//!
//! Every TCAT message is a single TLV record:
//! - A 1-byte type tag
//! - A 1-byte length, or the escape byte `0xFF` followed by a 2-byte big-endian length
//! - The value bytes
//!
//! Values are opaque here. Text conventions (space-delimited commands,
//! pipe-delimited records, `RESP_*` sentinels) live in the client.

pub mod codec;
pub mod error;
#[cfg(feature = "async")]
pub mod stream;
pub mod types;

pub use codec::{
    decode_tlv, encode_tlv, Tlv, LONG_HEADER_SIZE, LONG_LENGTH_ESCAPE, MAX_VALUE_LEN,
    SHORT_HEADER_SIZE,
};
pub use error::{Malformed, Result, TlvError};
#[cfg(feature = "async")]
pub use stream::{CodecError, TlvCodec};
pub use types::{type_name, StatusCode, TlvType};
