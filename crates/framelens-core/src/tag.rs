//! Name/index conversions shared by the closed enum tags of the data model.
//!
//! Tags are written as their names. On read they accept a case-insensitive
//! name or the legacy integer index (declaration order), which is how older
//! device stores persisted them.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};
use serde_json::Value;

pub(crate) trait EnumTag: Sized + Copy + 'static {
    /// Human-readable tag family, used in error messages.
    const KIND: &'static str;
    /// All variants, in declaration order.
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.name().eq_ignore_ascii_case(name))
    }

    fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Name, then numeric index written as text (`"3"`).
    fn from_text(text: &str) -> Option<Self> {
        Self::from_name(text).or_else(|| {
            text.trim()
                .parse::<u64>()
                .ok()
                .and_then(Self::from_index)
        })
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Self::from_text(text),
            Value::Number(number) => number.as_u64().and_then(Self::from_index),
            _ => None,
        }
    }
}

pub(crate) fn serialize_tag<S, T>(tag: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: EnumTag,
{
    serializer.serialize_str(tag.name())
}

pub(crate) fn deserialize_tag<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: EnumTag,
{
    let value = Value::deserialize(deserializer)?;
    T::from_json(&value)
        .ok_or_else(|| de::Error::custom(UnknownTag { kind: T::KIND, value }))
}

/// Like [`deserialize_tag`], but falls back to `fallback` (with a warning)
/// instead of failing the whole document.
pub(crate) fn deserialize_tag_or<'de, D, T>(deserializer: D, fallback: T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: EnumTag,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::from_json(&value).unwrap_or_else(|| {
        tracing::warn!(
            kind = T::KIND,
            %value,
            replacement = fallback.name(),
            "unknown tag in stored data"
        );
        fallback
    }))
}

struct UnknownTag {
    kind: &'static str,
    value: Value,
}

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} tag: {}", self.kind, self.value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::EnumTag;
    use crate::{Endianness, FieldType, PayloadFormat};

    #[test]
    fn names_match_case_insensitively() {
        assert_eq!(FieldType::from_text("uint16"), Some(FieldType::UInt16));
        assert_eq!(FieldType::from_text(" AsciiString "), Some(FieldType::AsciiString));
        assert_eq!(Endianness::from_text("BIG"), Some(Endianness::Big));
    }

    #[test]
    fn legacy_indices_follow_declaration_order() {
        assert_eq!(PayloadFormat::from_json(&json!(0)), Some(PayloadFormat::HexDump));
        assert_eq!(PayloadFormat::from_json(&json!(1)), Some(PayloadFormat::Binary));
        assert_eq!(FieldType::from_text("3"), Some(FieldType::UInt32));
        assert_eq!(FieldType::from_json(&json!(8)), Some(FieldType::Fixed));
        assert_eq!(FieldType::from_json(&json!(9)), None);
        assert_eq!(FieldType::from_json(&json!(-1)), None);
    }

    #[test]
    fn non_scalar_values_are_rejected() {
        assert_eq!(Endianness::from_json(&json!(null)), None);
        assert_eq!(Endianness::from_json(&json!(["Big"])), None);
    }
}
