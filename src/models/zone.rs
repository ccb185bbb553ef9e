// Zone model (512-byte record)
//
// A zone is a named, ordered list of channel references. The record holds a
// u16 count, two reserved bytes, a 16-byte name and up to 246 u16 channel
// indices (one-based, as the radio displays them).

use serde::{Deserialize, Serialize};

/// Channel slots that fit after the 20-byte header of a 512-byte record.
pub const ZONE_MAX_CHANNELS: usize = 246;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zero-based slot in the zone region (0..255).
    pub index: u16,
    pub name: String,
    /// One-based channel indices, in display order.
    pub channels: Vec<u16>,
    /// Bytes 0x02..0x04; preserved verbatim.
    pub reserved: [u8; 2],
}

impl Zone {
    pub fn new(index: u16, name: &str) -> Self {
        Zone {
            index,
            name: name.to_string(),
            channels: Vec::new(),
            reserved: [0; 2],
        }
    }

    /// Append a channel reference, refusing past the record capacity.
    pub fn push_channel(&mut self, channel: u16) -> bool {
        if self.channels.len() >= ZONE_MAX_CHANNELS {
            return false;
        }
        self.channels.push(channel);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_cap() {
        let mut zone = Zone::new(0, "Full");
        for ch in 1..=ZONE_MAX_CHANNELS as u16 {
            assert!(zone.push_channel(ch));
        }
        assert!(!zone.push_channel(999));
        assert_eq!(zone.channels.len(), ZONE_MAX_CHANNELS);
    }
}
