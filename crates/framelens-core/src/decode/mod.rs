//! Per-field decoding of a captured buffer.
//!
//! Layering:
//! - `reader`: bounds-checked slicing and byte-order conventions
//! - `parser`: one typed decode per field type (no direct byte indexing)
//! - `error`: explicit, displayable decode failures
//!
//! Decoding never fails past [`decode_field`]: errors become
//! [`FieldValue::DecodeError`](crate::FieldValue::DecodeError) entries.
//!
//! Big-endian values are read by reversing the field's whole slice and then
//! decoding the leading natural-width window as little-endian. When a numeric
//! field is wider than its type, little-endian reads the first bytes of the
//! slice and big-endian reads the last bytes; the rest is ignored.

pub mod error;
pub mod parser;
pub mod reader;

pub use error::DecodeError;
pub use parser::decode_field;
