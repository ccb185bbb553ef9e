// SMS message model (256-byte record, device-only region)
//
// Message banks live in SPI flash but have no slot in the codeplug file;
// they are only reachable through a live read. Byte 0 carries the entry's
// kind and doubles as the occupancy check: a bank only holds entries of its
// own kind, anything else in byte 0 means the slot is empty.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Preset,
    Draft,
    Inbox,
    Outbox,
}

impl MessageKind {
    pub fn to_raw(self) -> u8 {
        match self {
            MessageKind::Preset => 0,
            MessageKind::Draft => 1,
            MessageKind::Inbox => 2,
            MessageKind::Outbox => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallType {
    Private,
    Group,
    All,
    Other(u8),
}

impl CallType {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => CallType::Private,
            1 => CallType::Group,
            2 => CallType::All,
            other => CallType::Other(other),
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            CallType::Private => 0,
            CallType::Group => 1,
            CallType::All => 2,
            CallType::Other(raw) => raw,
        }
    }
}

/// Wall-clock stamp as the radio stores it, two-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTimestamp {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Zero-based slot within the bank.
    pub index: u16,
    pub kind: MessageKind,
    pub call_type: CallType,
    /// DMR ID of the counterparty, 0 when absent.
    pub contact_id: u32,
    /// Only inbox/outbox entries carry a stamp.
    pub timestamp: Option<MessageTimestamp>,
    pub text: String,
}
