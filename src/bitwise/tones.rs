// CTCSS/DCS sub-audio encoding for analog channels
//
// Stored as a u16 (little-endian in the record):
// - bits 12-15: type (0x0 none, 0x1 CTCSS, 0x2 DCS normal, 0x3 DCS inverted)
// - bits 0-11:  value (CTCSS: frequency in Hz x 10; DCS: octal code read as
//   base-8 digits, e.g. D023 -> 0*64 + 2*8 + 3 = 19)

use serde::{Deserialize, Serialize};
use std::fmt;

const TYPE_NONE: u16 = 0x0;
const TYPE_CTCSS: u16 = 0x1;
const TYPE_DCS_NORMAL: u16 = 0x2;
const TYPE_DCS_INVERTED: u16 = 0x3;

/// A sub-audio squelch setting on an analog channel.
///
/// `Raw` carries encodings whose type nibble is outside the known set, so an
/// unrecognised value survives a decode/encode cycle byte-for-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubAudio {
    None,
    /// CTCSS tone, tenths of Hz (67.0 Hz is stored as 670)
    Ctcss(u16),
    /// DCS code as its three octal digits, normal polarity
    DcsNormal(u16),
    /// DCS code as its three octal digits, inverted polarity
    DcsInverted(u16),
    /// Unknown type nibble, preserved verbatim
    Raw(u16),
}

impl SubAudio {
    /// Decode from the stored u16.
    pub fn from_raw(value: u16) -> Self {
        let kind = (value >> 12) & 0x0F;
        let val = value & 0x0FFF;
        match kind {
            TYPE_NONE if val == 0 => SubAudio::None,
            TYPE_CTCSS => SubAudio::Ctcss(val),
            TYPE_DCS_NORMAL => SubAudio::DcsNormal(val),
            TYPE_DCS_INVERTED => SubAudio::DcsInverted(val),
            _ => SubAudio::Raw(value),
        }
    }

    /// Encode to the stored u16.
    pub fn to_raw(self) -> u16 {
        match self {
            SubAudio::None => 0x0000,
            SubAudio::Ctcss(v) => (TYPE_CTCSS << 12) | (v & 0x0FFF),
            SubAudio::DcsNormal(v) => (TYPE_DCS_NORMAL << 12) | (v & 0x0FFF),
            SubAudio::DcsInverted(v) => (TYPE_DCS_INVERTED << 12) | (v & 0x0FFF),
            SubAudio::Raw(v) => v,
        }
    }

    /// Decode from the two little-endian bytes of a record field.
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self::from_raw(u16::from_le_bytes(bytes))
    }

    /// Encode to the two little-endian bytes of a record field.
    pub fn to_bytes(self) -> [u8; 2] {
        self.to_raw().to_le_bytes()
    }

    /// Parse a display string: "None"/"", "67.0", "D023N", "D023I".
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("none") {
            return Some(SubAudio::None);
        }
        if let Some(rest) = text.strip_prefix(['D', 'd']) {
            if rest.len() < 4 {
                return None;
            }
            let digits: Vec<u32> = rest[..3].chars().map(|c| c.to_digit(8)).collect::<Option<_>>()?;
            let code = (digits[0] * 64 + digits[1] * 8 + digits[2]) as u16;
            return match rest.as_bytes()[3] {
                b'N' | b'n' => Some(SubAudio::DcsNormal(code)),
                b'I' | b'i' => Some(SubAudio::DcsInverted(code)),
                _ => None,
            };
        }
        let tenths = (text.parse::<f64>().ok()? * 10.0).round() as u16;
        Some(SubAudio::Ctcss(tenths))
    }
}

impl fmt::Display for SubAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubAudio::None => write!(f, "None"),
            SubAudio::Ctcss(v) => write!(f, "{}.{}", v / 10, v % 10),
            SubAudio::DcsNormal(v) => write!(f, "D{:03o}N", v),
            SubAudio::DcsInverted(v) => write!(f, "D{:03o}I", v),
            SubAudio::Raw(v) => write!(f, "0x{:04X}", v),
        }
    }
}
