// Broadcast FM receiver state (1024-byte region)
//
// A 5-byte header selects the active mode and channel, followed by 16
// preset areas of 48 bytes each: a 16-byte name and 16 u16 frequencies in
// units of 0.1 MHz (0xFFFF = empty slot).

use serde::{Deserialize, Serialize};

pub const FM_PRESET_COUNT: usize = 16;
pub const FM_PRESET_SLOTS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FmSettings {
    pub mode: u8,
    pub standby: u8,
    /// Selected preset area (0..15).
    pub area: u8,
    /// Selected frequency slot within the area (0..15).
    pub channel: u8,
    pub scan_mode: u8,
    pub presets: Vec<FmPreset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FmPreset {
    pub index: u8,
    pub name: String,
    /// Raw slot values: MHz x 10, 0xFFFF for an empty slot.
    pub frequencies: Vec<u16>,
}

impl FmPreset {
    /// The frequency of a slot in MHz, or `None` if the slot is empty.
    pub fn frequency_mhz(&self, slot: usize) -> Option<f64> {
        match self.frequencies.get(slot) {
            Some(&raw) if raw != 0xFFFF => Some(raw as f64 / 10.0),
            _ => None,
        }
    }

    pub fn set_frequency_mhz(&mut self, slot: usize, mhz: Option<f64>) {
        if slot < self.frequencies.len() {
            self.frequencies[slot] = match mhz {
                Some(m) => (m * 10.0).round() as u16,
                None => 0xFFFF,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_slot_units() {
        let mut preset = FmPreset {
            index: 0,
            name: "Local".into(),
            frequencies: vec![0xFFFF; FM_PRESET_SLOTS],
        };
        preset.set_frequency_mhz(0, Some(97.3));
        assert_eq!(preset.frequencies[0], 973);
        assert_eq!(preset.frequency_mhz(0), Some(97.3));
        assert_eq!(preset.frequency_mhz(1), None);
    }
}
