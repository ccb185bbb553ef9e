// RX group list model (272-byte record)
//
// A group list names up to 128 contact references. Slots hold one-based
// contact indices; 0xFFFF marks an unused slot.

use serde::{Deserialize, Serialize};

pub const GROUP_LIST_MAX_CONTACTS: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupList {
    /// Zero-based slot in the group list region (0..31).
    pub index: u16,
    pub name: String,
    /// One-based contact indices, in slot order.
    pub contacts: Vec<u16>,
}

impl GroupList {
    pub fn new(index: u16, name: &str) -> Self {
        GroupList {
            index,
            name: name.to_string(),
            contacts: Vec::new(),
        }
    }

    pub fn push_contact(&mut self, contact: u16) -> bool {
        if self.contacts.len() >= GROUP_LIST_MAX_CONTACTS {
            return false;
        }
        self.contacts.push(contact);
        true
    }
}
