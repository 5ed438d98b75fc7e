/// Errors that can occur during TLV encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TlvError {
    /// The bytes do not form exactly one well-formed record.
    #[error("malformed TLV record: {0}")]
    MalformedRecord(Malformed),

    /// The value cannot be represented by the 16-bit extended length.
    #[error("TLV value too large ({size} bytes, max {max})")]
    ValueTooLarge { size: usize, max: usize },
}

/// Reason a record failed strict decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    /// Fewer bytes than the header requires.
    #[error("header needs {needed} bytes, buffer has {available}")]
    ShortHeader { needed: usize, available: usize },

    /// The declared value length runs past the end of the buffer.
    #[error("declared length {declared} exceeds remaining {available} bytes")]
    LengthOverrun { declared: usize, available: usize },

    /// Bytes left over after the record.
    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
}

impl From<Malformed> for TlvError {
    fn from(reason: Malformed) -> Self {
        TlvError::MalformedRecord(reason)
    }
}

pub type Result<T> = std::result::Result<T, TlvError>;
