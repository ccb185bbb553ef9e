// Bit-level field encodings shared by the codec layer

pub mod bcd;
pub mod text;
pub mod tones;

pub use bcd::{bcd4_to_int, int_to_bcd4};
pub use text::{decode_fixed_str, encode_fixed_str, encode_gbk};
pub use tones::SubAudio;
