// Zone record codec (512 bytes per slot)
//
// Layout: u16 channel count, two reserved bytes, 16-byte name, then up to
// 246 u16 channel indices. A count low byte of 0xFF can never occur in a
// valid record, so byte 0 == 0xFF doubles as the empty marker.

use crate::bitwise::{decode_fixed_str, encode_fixed_str};
use crate::memmap::region::RegionId;
use crate::models::zone::ZONE_MAX_CHANNELS;
use crate::models::Zone;

use super::{check_region_size, check_slot, CodecError};

pub const ZONE_SIZE: usize = 512;

const CHANNEL_LIST_OFFSET: usize = 0x14;

/// Decode one 512-byte zone record. `None` for an empty slot.
pub fn decode_slot(slot: usize, record: &[u8]) -> Result<Option<Zone>, CodecError> {
    check_slot(RegionId::Zones, slot)?;
    if record[0] == 0xFF {
        return Ok(None);
    }

    let name = decode_fixed_str(&record[0x04..0x14]);
    if name.is_empty() {
        return Ok(None);
    }

    let count = u16::from_le_bytes([record[0], record[1]]) as usize;
    let mut channels = Vec::new();
    for i in 0..count.min(ZONE_MAX_CHANNELS) {
        let offset = CHANNEL_LIST_OFFSET + i * 2;
        let index = u16::from_le_bytes([record[offset], record[offset + 1]]);
        if index != 0xFFFF && (index as usize) < RegionId::Channels.info().count {
            channels.push(index);
        }
    }

    Ok(Some(Zone {
        index: slot as u16,
        name,
        channels,
        reserved: [record[0x02], record[0x03]],
    }))
}

/// Encode one zone to its 512-byte record.
pub fn encode(zone: &Zone) -> [u8; ZONE_SIZE] {
    let mut data = [0xFFu8; ZONE_SIZE];

    let count = zone.channels.len().min(ZONE_MAX_CHANNELS);
    data[0x00..0x02].copy_from_slice(&(count as u16).to_le_bytes());
    data[0x02] = zone.reserved[0];
    data[0x03] = zone.reserved[1];
    data[0x04..0x14].copy_from_slice(&encode_fixed_str(&zone.name, 16));
    for (i, &channel) in zone.channels.iter().take(count).enumerate() {
        let offset = CHANNEL_LIST_OFFSET + i * 2;
        data[offset..offset + 2].copy_from_slice(&channel.to_le_bytes());
    }

    data
}

/// Decode the whole zone region to its occupied slots.
pub fn decode_region(data: &[u8]) -> Result<Vec<Zone>, CodecError> {
    check_region_size(RegionId::Zones, data)?;
    let mut zones = Vec::new();
    for slot in 0..RegionId::Zones.info().count {
        let record = &data[slot * ZONE_SIZE..(slot + 1) * ZONE_SIZE];
        if let Some(zone) = decode_slot(slot, record)? {
            zones.push(zone);
        }
    }
    Ok(zones)
}

/// Rebuild the zone region: every entity at its own slot, the rest 0xFF.
pub fn encode_region(zones: &[Zone], data: &mut [u8]) -> Result<(), CodecError> {
    check_region_size(RegionId::Zones, data)?;
    data.fill(0xFF);
    for zone in zones {
        let slot = zone.index as usize;
        check_slot(RegionId::Zones, slot)?;
        data[slot * ZONE_SIZE..(slot + 1) * ZONE_SIZE].copy_from_slice(&encode(zone));
    }
    Ok(())
}
