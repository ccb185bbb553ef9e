// Group list record codec (272 bytes per slot)
//
// Byte 1 is the enabled flag (0x01 when the slot is occupied). The name is
// 14 bytes at offset 2, followed by 128 u16 contact slots; 0xFFFF marks an
// unused slot.

use crate::bitwise::{decode_fixed_str, encode_fixed_str};
use crate::memmap::region::RegionId;
use crate::models::grouplist::GROUP_LIST_MAX_CONTACTS;
use crate::models::GroupList;

use super::{check_region_size, check_slot, CodecError};

pub const GROUP_LIST_SIZE: usize = 272;

const CONTACT_LIST_OFFSET: usize = 0x10;

/// Decode one 272-byte group list record. `None` for an empty slot.
pub fn decode_slot(slot: usize, record: &[u8]) -> Result<Option<GroupList>, CodecError> {
    check_slot(RegionId::GroupLists, slot)?;
    if record[1] != 0x01 {
        return Ok(None);
    }

    let name = decode_fixed_str(&record[0x02..0x10]);
    if name.is_empty() {
        return Ok(None);
    }

    let mut contacts = Vec::new();
    for i in 0..GROUP_LIST_MAX_CONTACTS {
        let offset = CONTACT_LIST_OFFSET + i * 2;
        let index = u16::from_le_bytes([record[offset], record[offset + 1]]);
        if index != 0xFFFF && (index as usize) < RegionId::Contacts.info().count {
            contacts.push(index);
        }
    }

    Ok(Some(GroupList {
        index: slot as u16,
        name,
        contacts,
    }))
}

/// Encode one group list to its 272-byte record.
pub fn encode(list: &GroupList) -> [u8; GROUP_LIST_SIZE] {
    let mut data = [0xFFu8; GROUP_LIST_SIZE];

    data[0x00] = 0x00;
    data[0x01] = 0x01;
    data[0x02..0x10].copy_from_slice(&encode_fixed_str(&list.name, 14));
    for i in 0..GROUP_LIST_MAX_CONTACTS {
        let offset = CONTACT_LIST_OFFSET + i * 2;
        let value = list.contacts.get(i).copied().unwrap_or(0xFFFF);
        data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    data
}

/// Decode the whole group list region to its occupied slots.
pub fn decode_region(data: &[u8]) -> Result<Vec<GroupList>, CodecError> {
    check_region_size(RegionId::GroupLists, data)?;
    let mut lists = Vec::new();
    for slot in 0..RegionId::GroupLists.info().count {
        let record = &data[slot * GROUP_LIST_SIZE..(slot + 1) * GROUP_LIST_SIZE];
        if let Some(list) = decode_slot(slot, record)? {
            lists.push(list);
        }
    }
    Ok(lists)
}

/// Rebuild the group list region: every entity at its own slot, the rest 0xFF.
pub fn encode_region(lists: &[GroupList], data: &mut [u8]) -> Result<(), CodecError> {
    check_region_size(RegionId::GroupLists, data)?;
    data.fill(0xFF);
    for list in lists {
        let slot = list.index as usize;
        check_slot(RegionId::GroupLists, slot)?;
        data[slot * GROUP_LIST_SIZE..(slot + 1) * GROUP_LIST_SIZE].copy_from_slice(&encode(list));
    }
    Ok(())
}
