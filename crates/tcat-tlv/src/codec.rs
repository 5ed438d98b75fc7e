use std::borrow::Cow;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Malformed, Result, TlvError};
use crate::types::{StatusCode, TlvType};

/// Short header: type (1) + length (1) = 2 bytes.
pub const SHORT_HEADER_SIZE: usize = 2;

/// Long header: type (1) + escape (1) + length (2 BE) = 4 bytes.
pub const LONG_HEADER_SIZE: usize = 4;

/// Length byte that announces a 2-byte extended length.
pub const LONG_LENGTH_ESCAPE: u8 = 0xFF;

/// Largest value the extended length can describe.
pub const MAX_VALUE_LEN: usize = u16::MAX as usize;

/// A single decoded TLV record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    /// Raw type tag. Tags outside [`TlvType`] are kept as-is.
    pub tlv_type: u8,
    /// The record value.
    pub value: Bytes,
}

impl Tlv {
    /// Create a new record.
    pub fn new(tlv_type: impl Into<u8>, value: impl Into<Bytes>) -> Self {
        Self {
            tlv_type: tlv_type.into(),
            value: value.into(),
        }
    }

    /// The known type for this tag, if any.
    pub fn kind(&self) -> Option<TlvType> {
        TlvType::try_from(self.tlv_type).ok()
    }

    /// Status carried by a `ResponseWithStatus` record.
    pub fn status(&self) -> Option<StatusCode> {
        if self.kind() != Some(TlvType::ResponseWithStatus) || self.value.len() != 1 {
            return None;
        }
        StatusCode::try_from(self.value[0]).ok()
    }

    /// The value decoded as text. Invalid UTF-8 is replaced, never rejected.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    /// Header length this record encodes with.
    pub fn header_size(&self) -> usize {
        if self.value.len() < LONG_LENGTH_ESCAPE as usize {
            SHORT_HEADER_SIZE
        } else {
            LONG_HEADER_SIZE
        }
    }

    /// The total wire size of this record (header + value).
    pub fn wire_size(&self) -> usize {
        self.header_size() + self.value.len()
    }

    /// Encode this record into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_tlv(self.tlv_type, &self.value, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Decode exactly one record from `data`.
    ///
    /// Strict: a short header, a length that runs past the buffer, and
    /// trailing bytes are all rejected with [`TlvError::MalformedRecord`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (header, declared) = match parse_header(data) {
            Header::Complete { header, value_len } => (header, value_len),
            Header::Incomplete { needed } => {
                return Err(Malformed::ShortHeader {
                    needed,
                    available: data.len(),
                }
                .into())
            }
        };

        let available = data.len() - header;
        if declared > available {
            return Err(Malformed::LengthOverrun {
                declared,
                available,
            }
            .into());
        }
        if available > declared {
            return Err(Malformed::TrailingBytes(available - declared).into());
        }

        Ok(Self {
            tlv_type: data[0],
            value: Bytes::copy_from_slice(&data[header..]),
        })
    }
}

/// Encode a record into the wire format.
///
/// ```text
/// short: ┌──────────┬────────────┬──────────────┐
///        │ Type (1) │ Length (1) │ Value        │
///        └──────────┴────────────┴──────────────┘
/// long:  ┌──────────┬──────┬─────────────────┬──────────────┐
///        │ Type (1) │ 0xFF │ Length (2B BE)  │ Value        │
///        └──────────┴──────┴─────────────────┴──────────────┘
/// ```
pub fn encode_tlv(tlv_type: u8, value: &[u8], dst: &mut BytesMut) -> Result<()> {
    if value.len() > MAX_VALUE_LEN {
        return Err(TlvError::ValueTooLarge {
            size: value.len(),
            max: MAX_VALUE_LEN,
        });
    }

    if value.len() < LONG_LENGTH_ESCAPE as usize {
        dst.reserve(SHORT_HEADER_SIZE + value.len());
        dst.put_u8(tlv_type);
        dst.put_u8(value.len() as u8);
    } else {
        dst.reserve(LONG_HEADER_SIZE + value.len());
        dst.put_u8(tlv_type);
        dst.put_u8(LONG_LENGTH_ESCAPE);
        dst.put_u16(value.len() as u16);
    }
    dst.put_slice(value);
    Ok(())
}

/// Decode one record from the front of a stream buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete record yet; the
/// buffer is left untouched in that case. On success the record's bytes are
/// consumed.
pub fn decode_tlv(src: &mut BytesMut) -> Result<Option<Tlv>> {
    let (header, value_len) = match parse_header(src) {
        Header::Complete { header, value_len } => (header, value_len),
        Header::Incomplete { .. } => return Ok(None),
    };

    if src.len() < header + value_len {
        return Ok(None);
    }

    let tlv_type = src[0];
    src.advance(header);
    let value = src.split_to(value_len).freeze();

    Ok(Some(Tlv { tlv_type, value }))
}

enum Header {
    Complete { header: usize, value_len: usize },
    Incomplete { needed: usize },
}

fn parse_header(src: &[u8]) -> Header {
    if src.len() < SHORT_HEADER_SIZE {
        return Header::Incomplete {
            needed: SHORT_HEADER_SIZE,
        };
    }
    if src[1] != LONG_LENGTH_ESCAPE {
        return Header::Complete {
            header: SHORT_HEADER_SIZE,
            value_len: src[1] as usize,
        };
    }
    if src.len() < LONG_HEADER_SIZE {
        return Header::Incomplete {
            needed: LONG_HEADER_SIZE,
        };
    }
    Header::Complete {
        header: LONG_HEADER_SIZE,
        value_len: u16::from_be_bytes([src[2], src[3]]) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        encode_tlv(TlvType::Application.into(), b"Hello world!", &mut buf).unwrap();

        assert_eq!(buf.len(), SHORT_HEADER_SIZE + 12);
        assert_eq!(&buf[..2], &[0x82, 12]);

        let tlv = decode_tlv(&mut buf).unwrap().unwrap();
        assert_eq!(tlv.kind(), Some(TlvType::Application));
        assert_eq!(tlv.value.as_ref(), b"Hello world!");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_roundtrip_across_length_forms() {
        for len in [0usize, 1, 254, 255, 256, 4096, MAX_VALUE_LEN] {
            let value = vec![0x5A; len];
            let tlv = Tlv::new(TlvType::ActiveDataset, value.clone());
            let wire = tlv.to_bytes().unwrap();
            assert_eq!(wire.len(), tlv.wire_size());

            let decoded = Tlv::from_bytes(&wire).unwrap();
            assert_eq!(decoded, tlv, "length {len}");
            assert_eq!(decoded.to_bytes().unwrap(), wire, "length {len}");
        }
    }

    #[test]
    fn test_long_form_header_layout() {
        let tlv = Tlv::new(0x20u8, vec![0u8; 300]);
        let wire = tlv.to_bytes().unwrap();
        assert_eq!(&wire[..4], &[0x20, 0xFF, 0x01, 0x2C]);
        assert_eq!(tlv.header_size(), LONG_HEADER_SIZE);
    }

    #[test]
    fn test_value_too_large() {
        let mut buf = BytesMut::new();
        let value = vec![0u8; MAX_VALUE_LEN + 1];
        let result = encode_tlv(0x82, &value, &mut buf);
        assert!(matches!(result, Err(TlvError::ValueTooLarge { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_from_bytes_short_header() {
        let err = Tlv::from_bytes(&[0x82]).unwrap_err();
        assert_eq!(
            err,
            TlvError::MalformedRecord(Malformed::ShortHeader {
                needed: 2,
                available: 1
            })
        );

        let err = Tlv::from_bytes(&[0x82, 0xFF, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            TlvError::MalformedRecord(Malformed::ShortHeader { needed: 4, .. })
        ));
    }

    #[test]
    fn test_from_bytes_length_overrun() {
        let err = Tlv::from_bytes(&[0x82, 5, b'a', b'b']).unwrap_err();
        assert_eq!(
            err,
            TlvError::MalformedRecord(Malformed::LengthOverrun {
                declared: 5,
                available: 2
            })
        );
    }

    #[test]
    fn test_from_bytes_trailing_bytes() {
        let err = Tlv::from_bytes(&[0x01, 1, 0x00, 0xEE]).unwrap_err();
        assert_eq!(err, TlvError::MalformedRecord(Malformed::TrailingBytes(1)));
    }

    #[test]
    fn test_decode_incomplete_leaves_buffer_untouched() {
        let mut buf = BytesMut::new();
        encode_tlv(0x82, b"wifi_scan", &mut buf).unwrap();
        let full = buf.clone();
        buf.truncate(5);
        let partial = buf.clone();

        assert!(decode_tlv(&mut buf).unwrap().is_none());
        assert_eq!(buf, partial);

        buf.extend_from_slice(&full[5..]);
        let tlv = decode_tlv(&mut buf).unwrap().unwrap();
        assert_eq!(tlv.text(), "wifi_scan");
    }

    #[test]
    fn test_decode_incomplete_long_header() {
        let mut buf = BytesMut::from(&[0x82, 0xFF, 0x01][..]);
        assert!(decode_tlv(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_multiple_records() {
        let mut buf = BytesMut::new();
        encode_tlv(0x02, b"1|home|6|2.4GHz|-40|WPA2", &mut buf).unwrap();
        encode_tlv(0x02, b"RESP_OK", &mut buf).unwrap();

        let first = decode_tlv(&mut buf).unwrap().unwrap();
        let second = decode_tlv(&mut buf).unwrap().unwrap();
        assert_eq!(first.text(), "1|home|6|2.4GHz|-40|WPA2");
        assert_eq!(second.text(), "RESP_OK");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_value() {
        let tlv = Tlv::new(TlvType::ThreadStart, Bytes::new());
        let wire = tlv.to_bytes().unwrap();
        assert_eq!(wire.as_ref(), &[0x27, 0x00]);
        assert_eq!(Tlv::from_bytes(&wire).unwrap(), tlv);
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let tlv = Tlv::from_bytes(&[0xEE, 1, 0x42]).unwrap();
        assert_eq!(tlv.tlv_type, 0xEE);
        assert!(tlv.kind().is_none());
    }

    #[test]
    fn test_status_accessor() {
        let ok = Tlv::new(TlvType::ResponseWithStatus, vec![0x00]);
        assert_eq!(ok.status(), Some(StatusCode::Success));

        let busy = Tlv::new(TlvType::ResponseWithStatus, vec![0x05]);
        assert_eq!(busy.status(), Some(StatusCode::Busy));

        let payload = Tlv::new(TlvType::ResponseWithPayload, vec![0x00]);
        assert_eq!(payload.status(), None);
    }
}
