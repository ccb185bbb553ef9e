// Fixed-width GBK string fields
//
// Names, aliases and DTMF codes are stored as fixed-width byte fields,
// GBK encoded and padded to the field width with 0xFF.

use encoding_rs::GBK;

/// Decode a fixed-width, 0xFF-padded GBK field to a string.
///
/// Reading stops at the first 0xFF pad byte; undecodable sequences fall back
/// to the replacement character rather than failing, since the display name
/// is never structurally load-bearing.
pub fn decode_fixed_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0xFF).unwrap_or(field.len());
    let (text, _, _) = GBK.decode(&field[..end]);
    text.trim_matches(|c: char| c == '\0' || c == ' ').to_string()
}

/// Encode a string into a fixed-width GBK field, truncating to `width` bytes
/// and padding the remainder with 0xFF.
pub fn encode_fixed_str(text: &str, width: usize) -> Vec<u8> {
    let (encoded, _, _) = GBK.encode(text);
    let mut field = vec![0xFFu8; width];
    let take = encoded.len().min(width);
    field[..take].copy_from_slice(&encoded[..take]);
    field
}

/// Encode a string to raw GBK bytes (no padding), for bulk payloads such as
/// the address-book upload.
pub fn encode_gbk(text: &str) -> Vec<u8> {
    let (encoded, _, _) = GBK.encode(text);
    encoded.into_owned()
}
