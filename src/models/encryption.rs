// Encryption key model (48-byte record)
//
// Keys are stored as nibble-packed hex digits, 0xF-padded. The three
// algorithms fix the digit count: ARC 10, AES-128 32, AES-256 64.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionType {
    Arc,
    Aes128,
    Aes256,
}

impl EncryptionType {
    /// The number of hex digits a key of this type carries.
    pub fn hex_digits(self) -> usize {
        match self {
            EncryptionType::Arc => 10,
            EncryptionType::Aes128 => 32,
            EncryptionType::Aes256 => 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionKey {
    /// Zero-based slot in the key region.
    pub index: u16,
    pub alias: String,
    pub algorithm: EncryptionType,
    /// Uppercase hex digits, `algorithm.hex_digits()` long.
    pub key: String,
}

impl EncryptionKey {
    pub fn new(index: u16, alias: &str, algorithm: EncryptionType, key: &str) -> Self {
        EncryptionKey {
            index,
            alias: alias.to_string(),
            algorithm,
            key: key.to_uppercase(),
        }
    }

    /// Whether the key string has the right length and only hex digits.
    pub fn key_is_valid(&self) -> bool {
        self.key.len() == self.algorithm.hex_digits()
            && self.key.chars().all(|c| c.is_ascii_hexdigit())
    }
}
