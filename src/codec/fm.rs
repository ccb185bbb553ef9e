// Broadcast FM codec (1 KiB region)
//
// A 5-byte header, then 16 presets of 48 bytes (16-byte name + 16 u16
// frequency slots). Bytes past the preset table belong to the firmware and
// are preserved, so this is a patch codec like settings.

use crate::bitwise::{decode_fixed_str, encode_fixed_str};
use crate::memmap::region::RegionId;
use crate::models::fm::{FM_PRESET_COUNT, FM_PRESET_SLOTS};
use crate::models::{FmPreset, FmSettings};

use super::{check_region_size, CodecError};

const HEADER_SIZE: usize = 5;
const PRESET_SIZE: usize = 48;
const NAME_SIZE: usize = 16;

/// Decode the FM region into a settings model.
pub fn decode(data: &[u8]) -> Result<FmSettings, CodecError> {
    check_region_size(RegionId::FmSettings, data)?;

    // unprogrammed header bytes read as their defaults
    let byte = |i: usize| if data[i] == 0xFF { 0 } else { data[i] };

    let mut presets = Vec::with_capacity(FM_PRESET_COUNT);
    for i in 0..FM_PRESET_COUNT {
        let base = HEADER_SIZE + i * PRESET_SIZE;
        let name = decode_fixed_str(&data[base..base + NAME_SIZE]);
        let mut frequencies = Vec::with_capacity(FM_PRESET_SLOTS);
        for slot in 0..FM_PRESET_SLOTS {
            let off = base + NAME_SIZE + slot * 2;
            frequencies.push(u16::from_le_bytes([data[off], data[off + 1]]));
        }
        presets.push(FmPreset {
            index: i as u8,
            name,
            frequencies,
        });
    }

    Ok(FmSettings {
        mode: byte(0),
        standby: byte(1),
        area: byte(2).min(15),
        channel: byte(3).min(15),
        scan_mode: byte(4),
        presets,
    })
}

/// Patch the FM model into the region, preserving the firmware tail.
pub fn encode_into(fm: &FmSettings, data: &mut [u8]) -> Result<(), CodecError> {
    check_region_size(RegionId::FmSettings, data)?;

    data[0] = fm.mode;
    data[1] = fm.standby;
    data[2] = fm.area;
    data[3] = fm.channel;
    data[4] = fm.scan_mode;

    for i in 0..FM_PRESET_COUNT {
        let base = HEADER_SIZE + i * PRESET_SIZE;
        let preset = fm.presets.iter().find(|p| p.index as usize == i);
        match preset {
            Some(p) => {
                data[base..base + NAME_SIZE].copy_from_slice(&encode_fixed_str(&p.name, NAME_SIZE));
                for slot in 0..FM_PRESET_SLOTS {
                    let off = base + NAME_SIZE + slot * 2;
                    let raw = p.frequencies.get(slot).copied().unwrap_or(0xFFFF);
                    data[off..off + 2].copy_from_slice(&raw.to_le_bytes());
                }
            }
            None => {
                data[base..base + PRESET_SIZE].fill(0xFF);
            }
        }
    }

    Ok(())
}
