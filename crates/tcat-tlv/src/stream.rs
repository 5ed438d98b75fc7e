//! `tokio_util::codec` adapter for delimiting TLV records in a byte stream.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::codec::{decode_tlv, encode_tlv, Tlv, MAX_VALUE_LEN};
use crate::error::TlvError;

/// Errors surfaced by [`TlvCodec`].
///
/// `tokio_util` codecs must accept I/O errors from the framed stream, so the
/// record error is wrapped alongside them.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Tlv(#[from] TlvError),

    #[error("TLV stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream codec for TLV records.
#[derive(Debug, Clone)]
pub struct TlvCodec {
    max_value_len: usize,
}

impl TlvCodec {
    pub fn new() -> Self {
        Self::with_max_value_len(MAX_VALUE_LEN)
    }

    /// Reject records whose value is longer than `max_value_len`.
    pub fn with_max_value_len(max_value_len: usize) -> Self {
        Self {
            max_value_len: max_value_len.min(MAX_VALUE_LEN),
        }
    }

    pub fn max_value_len(&self) -> usize {
        self.max_value_len
    }
}

impl Default for TlvCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for TlvCodec {
    type Item = Tlv;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Tlv>, CodecError> {
        let Some(tlv) = decode_tlv(src)? else {
            return Ok(None);
        };
        if tlv.value.len() > self.max_value_len {
            return Err(TlvError::ValueTooLarge {
                size: tlv.value.len(),
                max: self.max_value_len,
            }
            .into());
        }
        trace!(tlv_type = tlv.tlv_type, len = tlv.value.len(), "decoded record");
        Ok(Some(tlv))
    }
}

impl Encoder<Tlv> for TlvCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Tlv, dst: &mut BytesMut) -> Result<(), CodecError> {
        if item.value.len() > self.max_value_len {
            return Err(TlvError::ValueTooLarge {
                size: item.value.len(),
                max: self.max_value_len,
            }
            .into());
        }
        encode_tlv(item.tlv_type, &item.value, dst)?;
        Ok(())
    }
}
