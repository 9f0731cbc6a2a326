//! Conversions between raw bytes and human-readable hex text.

const SEPARATORS: [char; 2] = [' ', '-'];

/// Renders bytes as uppercase hex pairs separated by single spaces.
///
/// # Examples
/// ```
/// assert_eq!(framelens_core::bytes_to_hex(&[0x0a, 0xff, 0x00]), "0A FF 00");
/// assert_eq!(framelens_core::bytes_to_hex(&[]), "");
/// ```
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

/// True iff `text`, with spaces and dashes removed, is a non-empty,
/// even-length run of hex digits.
pub fn is_valid_hex_text(text: &str) -> bool {
    let cleaned = strip_separators(text);
    !cleaned.is_empty()
        && cleaned.len() % 2 == 0
        && cleaned.chars().all(|c| c.is_ascii_hexdigit())
}

/// Decodes hex text (spaces and dashes ignored).
///
/// Odd-length or otherwise malformed input yields an empty vector rather
/// than a partial decode; use [`is_valid_hex_text`] to tell the two apart.
pub fn hex_to_bytes(text: &str) -> Vec<u8> {
    let cleaned = strip_separators(text);
    if cleaned.len() % 2 != 0 {
        return Vec::new();
    }
    hex::decode(cleaned).unwrap_or_default()
}

fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| !SEPARATORS.contains(c)).collect()
}
