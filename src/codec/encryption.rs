// Encryption key record codec (48 bytes per slot)
//
// The key material is nibble-packed hex at offset 16, padded with 0xF
// nibbles. The algorithm byte fixes how many digits are significant.

use crate::bitwise::{decode_fixed_str, encode_fixed_str};
use crate::memmap::region::RegionId;
use crate::models::{EncryptionKey, EncryptionType};

use super::{check_region_size, check_slot, CodecError};

pub const KEY_SIZE: usize = 48;

const KEY_MATERIAL_OFFSET: usize = 16;

/// Decode one 48-byte key record. `None` for an empty slot.
pub fn decode_slot(slot: usize, record: &[u8]) -> Result<Option<EncryptionKey>, CodecError> {
    check_slot(RegionId::EncryptionKeys, slot)?;
    if record[0] == 0x00 || record[0] == 0xFF {
        return Ok(None);
    }

    let algorithm = match record[1] {
        0x00 => EncryptionType::Arc,
        0x01 => EncryptionType::Aes128,
        0x02 => EncryptionType::Aes256,
        other => {
            return Err(CodecError::MalformedRecord {
                region: RegionId::EncryptionKeys,
                slot,
                reason: format!("key type byte 0x{:02X}", other),
            })
        }
    };

    let alias = decode_fixed_str(&record[2..16]);
    if alias.is_empty() {
        return Ok(None);
    }

    let mut key = String::new();
    for &byte in &record[KEY_MATERIAL_OFFSET..KEY_SIZE] {
        if byte == 0xFF {
            break;
        }
        key.push(char::from_digit(((byte >> 4) & 0x0F) as u32, 16).unwrap_or('0'));
        key.push(char::from_digit((byte & 0x0F) as u32, 16).unwrap_or('0'));
    }
    key.make_ascii_uppercase();
    key.truncate(algorithm.hex_digits());

    Ok(Some(EncryptionKey {
        index: slot as u16,
        alias,
        algorithm,
        key,
    }))
}

/// Encode one key to its 48-byte record.
pub fn encode(key: &EncryptionKey) -> [u8; KEY_SIZE] {
    let mut data = [0xFFu8; KEY_SIZE];

    let marker = (key.index as u8).wrapping_add(1);
    data[0] = if marker == 0 { 1 } else { marker };
    data[1] = match key.algorithm {
        EncryptionType::Arc => 0x00,
        EncryptionType::Aes128 => 0x01,
        EncryptionType::Aes256 => 0x02,
    };
    data[2..16].copy_from_slice(&encode_fixed_str(&key.alias, 14));

    let mut nibbles: Vec<u8> = key
        .key
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8).unwrap_or(0xF))
        .collect();
    nibbles.resize(2 * (KEY_SIZE - KEY_MATERIAL_OFFSET), 0xF);
    for (i, pair) in nibbles.chunks(2).enumerate() {
        data[KEY_MATERIAL_OFFSET + i] = (pair[0] << 4) | pair[1];
    }

    data
}

/// Decode the whole key region to its occupied slots.
pub fn decode_region(data: &[u8]) -> Result<Vec<EncryptionKey>, CodecError> {
    check_region_size(RegionId::EncryptionKeys, data)?;
    let mut keys = Vec::new();
    for slot in 0..RegionId::EncryptionKeys.info().count {
        let record = &data[slot * KEY_SIZE..(slot + 1) * KEY_SIZE];
        if let Some(key) = decode_slot(slot, record)? {
            keys.push(key);
        }
    }
    Ok(keys)
}

/// Rebuild the key region: every entity at its own slot, the rest 0xFF.
pub fn encode_region(keys: &[EncryptionKey], data: &mut [u8]) -> Result<(), CodecError> {
    check_region_size(RegionId::EncryptionKeys, data)?;
    data.fill(0xFF);
    for key in keys {
        let slot = key.index as usize;
        check_slot(RegionId::EncryptionKeys, slot)?;
        data[slot * KEY_SIZE..(slot + 1) * KEY_SIZE].copy_from_slice(&encode(key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_roundtrip() {
        let key = EncryptionKey::new(0, "Net", EncryptionType::Arc, "0123456789");
        let record = encode(&key);
        // 10 digits pack into 5 bytes, the rest is 0xF padding
        assert_eq!(&record[16..21], &[0x01, 0x23, 0x45, 0x67, 0x89]);
        assert_eq!(record[21], 0xFF);
        assert_eq!(decode_slot(0, &record).unwrap().unwrap(), key);
    }

    #[test]
    fn test_aes256_uses_full_field() {
        let hex: String = "0A".repeat(32);
        let key = EncryptionKey::new(7, "Long", EncryptionType::Aes256, &hex);
        let record = encode(&key);
        let decoded = decode_slot(7, &record).unwrap().unwrap();
        assert_eq!(decoded.key.len(), 64);
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_bad_type_is_malformed() {
        let mut record = [0xFFu8; KEY_SIZE];
        record[0] = 0x01;
        record[1] = 0x03;
        record[2..16].copy_from_slice(&encode_fixed_str("X", 14));
        assert!(matches!(
            decode_slot(4, &record).unwrap_err(),
            CodecError::MalformedRecord { region: RegionId::EncryptionKeys, slot: 4, .. }
        ));
    }

    #[test]
    fn test_empty_slot() {
        assert!(decode_slot(0, &[0xFFu8; KEY_SIZE]).unwrap().is_none());
        assert!(decode_slot(0, &[0x00u8; KEY_SIZE]).unwrap().is_none());
    }
}
