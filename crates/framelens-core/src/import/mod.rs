//! Tolerant import of externally authored schema JSON.
//!
//! Documents of unknown shape are mapped onto canonical [`FieldDef`]s using
//! declarative alias tables (`aliases`), consulted in priority order. Only a
//! missing field array or an empty one fails the import; per-item ambiguity
//! degrades to defaults (meaning `""`, offset/length `0`, type `Fixed`).
//!
//! [`FieldDef`]: crate::FieldDef

pub mod aliases;
pub mod error;
pub mod normalizer;

pub use error::ImportError;
pub use normalizer::{ImportedSchema, import_into, normalize_schema};
