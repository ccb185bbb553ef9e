// Binary-Coded Decimal handling for RT-4D ID fields
//
// DMR IDs (radio ID, contact ID) are stored as 4 little-endian BCD bytes:
// the value 2460001 is stored as [0x01, 0x00, 0x46, 0x02]. The firmware
// treats 0xF nibbles as zero and an all-0xFF field as "no ID".

/// Decode a 4-byte little-endian BCD field to an integer.
///
/// Matches the radio's lenient decoder: 0xF nibbles read as 0, an all-0xFF
/// field reads as 0, and any other non-decimal nibble invalidates the whole
/// field (decodes to 0 rather than a garbage ID).
pub fn bcd4_to_int(bytes: &[u8; 4]) -> u32 {
    if bytes.iter().all(|&b| b == 0xFF) {
        return 0;
    }

    let mut value: u32 = 0;
    for &byte in bytes.iter().rev() {
        let mut high = (byte >> 4) & 0x0F;
        let mut low = byte & 0x0F;
        if (high > 9 && high != 0xF) || (low > 9 && low != 0xF) {
            return 0;
        }
        if high == 0xF {
            high = 0;
        }
        if low == 0xF {
            low = 0;
        }
        value = value * 100 + (high as u32) * 10 + low as u32;
    }
    value
}

/// Encode an integer as a 4-byte little-endian BCD field.
///
/// Values above 99,999,999 are truncated modulo 10^8; DMR IDs are 24-bit so
/// callers never hit that in practice.
pub fn int_to_bcd4(mut value: u32) -> [u8; 4] {
    let mut bcd = [0u8; 4];
    for slot in bcd.iter_mut() {
        let low = (value % 10) as u8;
        value /= 10;
        let high = (value % 10) as u8;
        value /= 10;
        *slot = (high << 4) | low;
    }
    bcd
}
