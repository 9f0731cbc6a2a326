//! Structural validation of a device's field list.
//!
//! Validation is advisory and never mutates the schema: every violation is
//! reported (not just the first), and the caller decides whether to block
//! decoding. Per-field checks run first (offset sign, length sign, minimum
//! width per type), then pairwise overlap detection, then the extent
//! heuristic.

pub mod error;
pub mod validator;

pub use error::ValidationError;
pub use validator::{SUSPICIOUS_EXTENT, validate_fields};
