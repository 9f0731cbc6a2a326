use thiserror::Error;

use crate::FieldType;

/// One schema defect reported by [`validate_fields`](super::validate_fields).
///
/// # Examples
/// ```
/// use framelens_core::ValidationError;
///
/// let err = ValidationError::SuspiciousExtent { max_end: 2048 };
/// assert!(err.is_advisory());
/// assert!(err.to_string().contains("suspiciously large"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' has negative offset {offset}.")]
    NegativeOffset { field: String, offset: i64 },
    #[error("Field '{field}' has invalid length {length}.")]
    InvalidLength { field: String, length: i64 },
    #[error("Field '{field}' type {field_type} requires at least {min} byte{}.", plural(.min))]
    TooShortForType {
        field: String,
        field_type: FieldType,
        min: usize,
    },
    #[error(
        "Fields '{first}' (offset {first_start}-{first_end}) and '{second}' (offset {second_start}-{second_end}) overlap."
    )]
    Overlap {
        first: String,
        first_start: i64,
        first_end: i64,
        second: String,
        second_start: i64,
        second_end: i64,
    },
    #[error("Max field end {max_end} looks suspiciously large.")]
    SuspiciousExtent { max_end: i64 },
}

impl ValidationError {
    /// True for heuristics that callers may downgrade to a warning.
    pub fn is_advisory(&self) -> bool {
        matches!(self, ValidationError::SuspiciousExtent { .. })
    }
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 { "" } else { "s" }
}
