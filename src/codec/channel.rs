// Channel record codec (48 bytes per slot)
//
// Byte 0x02 is the mode discriminator: 0x00 digital, anything else analog.
// Digital and analog overlay different fields on offsets 0x00 and
// 0x03..0x20; the name field and frequencies are common to both.

use crate::bitwise::{bcd4_to_int, decode_fixed_str, encode_fixed_str, int_to_bcd4, SubAudio};
use crate::memmap::region::RegionId;
use crate::models::{
    AnalogChannel, Channel, ChannelConfig, DigitalChannel, Frequency, Modulation, PowerLevel,
    ScanMode,
};

use super::{check_region_size, check_slot, CodecError};

pub const CHANNEL_SIZE: usize = 48;

const MODE_DIGITAL: u8 = 0x00;
const SCAN_ADD: u8 = 0x00;
const SCAN_REMOVE: u8 = 0x80;

/// Decode one 48-byte channel record. `None` for an empty slot.
pub fn decode_slot(slot: usize, record: &[u8]) -> Result<Option<Channel>, CodecError> {
    check_slot(RegionId::Channels, slot)?;
    if record[0] == 0xFF && record[1] == 0xFF {
        return Ok(None);
    }

    let enabled = record[1] == 0x01;
    let rx_freq = Frequency(u32::from_le_bytes([
        record[0x06], record[0x07], record[0x08], record[0x09],
    ]));
    let tx_freq = Frequency(u32::from_le_bytes([
        record[0x0A], record[0x0B], record[0x0C], record[0x0D],
    ]));
    let power = if record[0x10] == 0x01 {
        PowerLevel::High
    } else {
        PowerLevel::Low
    };
    let name = decode_fixed_str(&record[0x20..0x30]);

    let config = if record[0x02] == MODE_DIGITAL {
        let contact_slot = u16::from_le_bytes([record[0x18], record[0x19]]);
        ChannelConfig::Digital(DigitalChannel {
            use_channel_id: record[0x00] != 0x00,
            dmr_id: bcd4_to_int(&[record[0x1C], record[0x1D], record[0x1E], record[0x1F]]),
            time_slot: record[0x03],
            color_code: record[0x04],
            dmr_mode: record[0x05],
            monitor: record[0x0E],
            scan: if record[0x13] == SCAN_ADD {
                ScanMode::Add
            } else {
                ScanMode::Remove
            },
            tot: record[0x14],
            alarm: record[0x15],
            group_list: u16::from_le_bytes([record[0x16], record[0x17]]),
            // on the wire contacts are 0-based slots, in the model 1-based
            contact: if contact_slot == 0xFFFF {
                0
            } else {
                contact_slot + 1
            },
            encrypt_key: u16::from_le_bytes([record[0x1A], record[0x1B]]),
            reserved_0f: record[0x0F],
            reserved_12: record[0x12],
        })
    } else {
        let modulation = match record[0x00] {
            0x00 => Modulation::Fm,
            0x01 => Modulation::Am,
            0x02 => Modulation::Ssb,
            other => {
                return Err(CodecError::MalformedRecord {
                    region: RegionId::Channels,
                    slot,
                    reason: format!("modulation byte 0x{:02X}", other),
                })
            }
        };
        ChannelConfig::Analog(AnalogChannel {
            modulation,
            bandwidth: record[0x03],
            rx_tone: SubAudio::from_bytes([record[0x04], record[0x05]]),
            tx_tone: SubAudio::from_bytes([record[0x0E], record[0x0F]]),
            tot: record[0x12] & 0x1F,
            ctdcs_select: (record[0x12] >> 5) & 0x07,
            tail_tone: (record[0x13] >> 4) & 0x0F,
            scramble: record[0x13] & 0x0F,
            encrypted_code_1: u32::from_le_bytes([
                record[0x14], record[0x15], record[0x16], record[0x17],
            ]),
            encrypted_code_2: u32::from_le_bytes([
                record[0x18], record[0x19], record[0x1A], record[0x1B],
            ]),
            encrypted_code_3: u32::from_le_bytes([
                record[0x1C], record[0x1D], record[0x1E], record[0x1F],
            ]),
        })
    };

    Ok(Some(Channel {
        index: slot as u16,
        name,
        enabled,
        rx_freq,
        tx_freq,
        power,
        tx_priority: record[0x11],
        config,
    }))
}

/// Encode one channel to its 48-byte record.
pub fn encode(channel: &Channel) -> [u8; CHANNEL_SIZE] {
    let mut data = [0xFFu8; CHANNEL_SIZE];

    data[0x01] = if channel.enabled { 0x01 } else { 0xFF };
    data[0x06..0x0A].copy_from_slice(&channel.rx_freq.raw().to_le_bytes());
    data[0x0A..0x0E].copy_from_slice(&channel.tx_freq.raw().to_le_bytes());
    data[0x10] = match channel.power {
        PowerLevel::Low => 0x00,
        PowerLevel::High => 0x01,
    };
    data[0x11] = channel.tx_priority;
    data[0x20..0x30].copy_from_slice(&encode_fixed_str(&channel.name, 16));

    match &channel.config {
        ChannelConfig::Digital(d) => {
            data[0x00] = d.use_channel_id as u8;
            data[0x02] = MODE_DIGITAL;
            data[0x03] = d.time_slot;
            data[0x04] = d.color_code;
            data[0x05] = d.dmr_mode;
            data[0x0E] = d.monitor;
            data[0x0F] = d.reserved_0f;
            data[0x12] = d.reserved_12;
            data[0x13] = match d.scan {
                ScanMode::Add => SCAN_ADD,
                ScanMode::Remove => SCAN_REMOVE,
            };
            data[0x14] = d.tot;
            data[0x15] = d.alarm;
            data[0x16..0x18].copy_from_slice(&d.group_list.to_le_bytes());
            let contact_slot: u16 = if d.contact == 0 { 0xFFFF } else { d.contact - 1 };
            data[0x18..0x1A].copy_from_slice(&contact_slot.to_le_bytes());
            data[0x1A..0x1C].copy_from_slice(&d.encrypt_key.to_le_bytes());
            data[0x1C..0x20].copy_from_slice(&int_to_bcd4(d.dmr_id));
        }
        ChannelConfig::Analog(a) => {
            data[0x00] = match a.modulation {
                Modulation::Fm => 0x00,
                Modulation::Am => 0x01,
                Modulation::Ssb => 0x02,
            };
            data[0x02] = 0x01;
            data[0x03] = a.bandwidth;
            data[0x04..0x06].copy_from_slice(&a.rx_tone.to_bytes());
            data[0x0E..0x10].copy_from_slice(&a.tx_tone.to_bytes());
            data[0x12] = (a.tot & 0x1F) | ((a.ctdcs_select & 0x07) << 5);
            data[0x13] = ((a.tail_tone & 0x0F) << 4) | (a.scramble & 0x0F);
            data[0x14..0x18].copy_from_slice(&a.encrypted_code_1.to_le_bytes());
            data[0x18..0x1C].copy_from_slice(&a.encrypted_code_2.to_le_bytes());
            data[0x1C..0x20].copy_from_slice(&a.encrypted_code_3.to_le_bytes());
        }
    }

    data
}

/// Decode the whole channel region to its occupied slots.
pub fn decode_region(data: &[u8]) -> Result<Vec<Channel>, CodecError> {
    check_region_size(RegionId::Channels, data)?;
    let mut channels = Vec::new();
    for slot in 0..RegionId::Channels.info().count {
        let record = &data[slot * CHANNEL_SIZE..(slot + 1) * CHANNEL_SIZE];
        if let Some(channel) = decode_slot(slot, record)? {
            channels.push(channel);
        }
    }
    Ok(channels)
}

/// Rebuild the channel region: every entity at its own slot, the rest 0xFF.
pub fn encode_region(channels: &[Channel], data: &mut [u8]) -> Result<(), CodecError> {
    check_region_size(RegionId::Channels, data)?;
    data.fill(0xFF);
    for channel in channels {
        let slot = channel.index as usize;
        check_slot(RegionId::Channels, slot)?;
        data[slot * CHANNEL_SIZE..(slot + 1) * CHANNEL_SIZE].copy_from_slice(&encode(channel));
    }
    Ok(())
}
