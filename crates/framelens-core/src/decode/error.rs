use thiserror::Error;

use crate::FieldType;

/// Errors returned while decoding one field.
///
/// # Examples
/// ```
/// use framelens_core::DecodeError;
///
/// let err = DecodeError::OffsetOutOfRange { offset: 9, data_len: 4 };
/// assert_eq!(err.to_string(), "Offset 9 is out of range for data length 4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Offset {offset} is out of range for data length {data_len}")]
    OffsetOutOfRange { offset: i64, data_len: usize },
    #[error("Field '{field}' has invalid Length {length}. Length must be > 0.")]
    InvalidLength { field: String, length: i64 },
    #[error(
        "Field '{field}' (offset {offset}, length {length}) extends beyond data length {data_len}"
    )]
    BeyondData {
        field: String,
        offset: i64,
        length: i64,
        data_len: usize,
    },
    #[error("Insufficient data for {field_type}")]
    Insufficient { field_type: FieldType },
}
