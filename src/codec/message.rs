// SMS message codec (256 bytes per slot)
//
// Byte 0 holds the entry's kind and is also the occupancy check: each bank
// stores one kind, and any other value there means the slot is empty. The
// text field is 200 bytes of GBK at offset 56.

use crate::bitwise::{decode_fixed_str, encode_gbk};
use crate::memmap::region::RegionId;
use crate::models::{CallType, Message, MessageKind, MessageTimestamp};

use super::{check_region_size, check_slot, CodecError};

pub const MESSAGE_SIZE: usize = 256;

const TEXT_OFFSET: usize = 56;
const TEXT_MAX: usize = 200;

/// Decode one 256-byte entry. `None` when byte 0 does not match the bank's
/// kind, which is how the firmware marks an empty slot.
pub fn decode_slot(
    slot: usize,
    record: &[u8],
    expected: MessageKind,
) -> Result<Option<Message>, CodecError> {
    check_slot(RegionId::Messages, slot)?;
    if record[0] != expected.to_raw() {
        return Ok(None);
    }

    let contact_raw = u32::from_le_bytes([record[2], record[3], record[4], record[5]]);
    let contact_id = if contact_raw == 0xFFFF_FFFF { 0 } else { contact_raw };

    let ts = &record[6..12];
    let timestamp = if ts.iter().all(|&b| b == 0xFF) || ts.iter().all(|&b| b == 0x00) {
        None
    } else {
        Some(MessageTimestamp {
            year: ts[0],
            month: if (1..=12).contains(&ts[1]) { ts[1] } else { 1 },
            day: if (1..=31).contains(&ts[2]) { ts[2] } else { 1 },
            hour: if ts[3] <= 23 { ts[3] } else { 0 },
            minute: if ts[4] <= 59 { ts[4] } else { 0 },
            second: if ts[5] <= 59 { ts[5] } else { 0 },
        })
    };

    Ok(Some(Message {
        index: slot as u16,
        kind: expected,
        call_type: CallType::from_raw(record[1]),
        contact_id,
        timestamp,
        text: decode_fixed_str(&record[TEXT_OFFSET..TEXT_OFFSET + TEXT_MAX]),
    }))
}

/// Encode one message to its 256-byte entry.
pub fn encode(message: &Message) -> [u8; MESSAGE_SIZE] {
    let mut data = [0xFFu8; MESSAGE_SIZE];

    data[0] = message.kind.to_raw();
    data[1] = message.call_type.to_raw();
    if message.contact_id > 0 {
        data[2..6].copy_from_slice(&message.contact_id.to_le_bytes());
    }
    if let Some(ts) = message.timestamp {
        data[6] = ts.year;
        data[7] = ts.month;
        data[8] = ts.day;
        data[9] = ts.hour;
        data[10] = ts.minute;
        data[11] = ts.second;
    }

    let mut text = encode_gbk(&message.text);
    text.truncate(TEXT_MAX);
    data[TEXT_OFFSET..TEXT_OFFSET + text.len()].copy_from_slice(&text);

    data
}

/// Decode a full message bank to its occupied slots.
pub fn decode_region(data: &[u8], expected: MessageKind) -> Result<Vec<Message>, CodecError> {
    check_region_size(RegionId::Messages, data)?;
    let mut messages = Vec::new();
    for slot in 0..RegionId::Messages.info().count {
        let record = &data[slot * MESSAGE_SIZE..(slot + 1) * MESSAGE_SIZE];
        if let Some(message) = decode_slot(slot, record, expected)? {
            messages.push(message);
        }
    }
    Ok(messages)
}

/// Rebuild a message bank: every entry at its own slot, the rest 0xFF.
pub fn encode_region(messages: &[Message], data: &mut [u8]) -> Result<(), CodecError> {
    check_region_size(RegionId::Messages, data)?;
    data.fill(0xFF);
    for message in messages {
        let slot = message.index as usize;
        check_slot(RegionId::Messages, slot)?;
        data[slot * MESSAGE_SIZE..(slot + 1) * MESSAGE_SIZE].copy_from_slice(&encode(message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_roundtrip() {
        let msg = Message {
            index: 2,
            kind: MessageKind::Preset,
            call_type: CallType::Private,
            contact_id: 0,
            timestamp: None,
            text: "QSY to channel 5".into(),
        };
        let record = encode(&msg);
        let decoded = decode_slot(2, &record, MessageKind::Preset).unwrap().unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_kind_mismatch_is_empty() {
        let msg = Message {
            index: 0,
            kind: MessageKind::Inbox,
            call_type: CallType::Group,
            contact_id: 91,
            timestamp: Some(MessageTimestamp {
                year: 26,
                month: 8,
                day: 25,
                hour: 12,
                minute: 0,
                second: 0,
            }),
            text: "hi".into(),
        };
        let record = encode(&msg);
        assert!(decode_slot(0, &record, MessageKind::Preset).unwrap().is_none());
        assert!(decode_slot(0, &record, MessageKind::Inbox).unwrap().is_some());
    }

    #[test]
    fn test_blank_entry_is_empty() {
        let record = [0xFFu8; MESSAGE_SIZE];
        assert!(decode_slot(0, &record, MessageKind::Preset).unwrap().is_none());
    }

    #[test]
    fn test_text_truncated_to_field() {
        let msg = Message {
            index: 0,
            kind: MessageKind::Preset,
            call_type: CallType::Private,
            contact_id: 0,
            timestamp: None,
            text: "x".repeat(300),
        };
        let decoded = decode_slot(0, &encode(&msg), MessageKind::Preset).unwrap().unwrap();
        assert_eq!(decoded.text.len(), TEXT_MAX);
    }
}
