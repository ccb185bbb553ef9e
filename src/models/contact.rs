// DMR contact model (32-byte record)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    Private,
    Group,
    AllCall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Zero-based slot in the contact region (0..2047).
    pub index: u16,
    pub kind: ContactKind,
    pub dmr_id: u32,
    pub name: String,
    /// Byte 0 of the record. The firmware writes a truncated one-based index
    /// here and uses 0x00/0xFF to mean "empty"; preserved verbatim.
    pub marker: u8,
    /// Bytes 0x06..0x10, unused by the firmware UI; preserved verbatim.
    pub reserved: [u8; 10],
}

impl Contact {
    pub fn new(index: u16, name: &str, kind: ContactKind, dmr_id: u32) -> Self {
        Contact {
            index,
            kind,
            dmr_id,
            name: name.to_string(),
            marker: occupancy_marker(index),
            reserved: [0; 10],
        }
    }
}

/// The non-empty byte-0 value the firmware stores for a given slot.
pub(crate) fn occupancy_marker(index: u16) -> u8 {
    let m = (index as u8).wrapping_add(1);
    if m == 0 || m == 0xFF {
        1
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_never_looks_empty() {
        for index in 0..2048u16 {
            let m = occupancy_marker(index);
            assert_ne!(m, 0x00);
            assert_ne!(m, 0xFF);
        }
    }
}
