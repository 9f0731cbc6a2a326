use thiserror::Error;

/// Import-level failures. Item-level ambiguity never produces one.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(
        "no fields array found in JSON; expected a top-level array or a 'Fields' / 'ParsedFields' / 'packet_structure' property"
    )]
    NoFieldsArray,
    #[error("property '{key}' is not an array")]
    NotAnArray { key: &'static str },
    #[error("no valid fields were found in the JSON document")]
    NoUsableFields,
}
