// Contact record codec (32 bytes per slot)

use crate::bitwise::{bcd4_to_int, decode_fixed_str, encode_fixed_str, int_to_bcd4};
use crate::memmap::region::RegionId;
use crate::models::contact::occupancy_marker;
use crate::models::{Contact, ContactKind};

use super::{check_region_size, check_slot, CodecError};

pub const CONTACT_SIZE: usize = 32;

/// Decode one 32-byte contact record. `None` for an empty slot.
pub fn decode_slot(slot: usize, record: &[u8]) -> Result<Option<Contact>, CodecError> {
    check_slot(RegionId::Contacts, slot)?;
    if record[0] == 0x00 || record[0] == 0xFF {
        return Ok(None);
    }

    let kind = match record[0x01] {
        0x00 => ContactKind::Private,
        0x01 => ContactKind::Group,
        0x02 => ContactKind::AllCall,
        other => {
            return Err(CodecError::MalformedRecord {
                region: RegionId::Contacts,
                slot,
                reason: format!("contact type byte 0x{:02X}", other),
            })
        }
    };

    let mut reserved = [0u8; 10];
    reserved.copy_from_slice(&record[0x06..0x10]);

    Ok(Some(Contact {
        index: slot as u16,
        kind,
        dmr_id: bcd4_to_int(&[record[0x02], record[0x03], record[0x04], record[0x05]]),
        name: decode_fixed_str(&record[0x10..0x20]),
        marker: record[0x00],
        reserved,
    }))
}

/// Encode one contact to its 32-byte record.
pub fn encode(contact: &Contact) -> [u8; CONTACT_SIZE] {
    let mut data = [0xFFu8; CONTACT_SIZE];

    data[0x00] = if contact.marker == 0x00 || contact.marker == 0xFF {
        occupancy_marker(contact.index)
    } else {
        contact.marker
    };
    data[0x01] = match contact.kind {
        ContactKind::Private => 0x00,
        ContactKind::Group => 0x01,
        ContactKind::AllCall => 0x02,
    };
    data[0x02..0x06].copy_from_slice(&int_to_bcd4(contact.dmr_id));
    data[0x06..0x10].copy_from_slice(&contact.reserved);
    data[0x10..0x20].copy_from_slice(&encode_fixed_str(&contact.name, 16));

    data
}

/// Decode the whole contact region to its occupied slots.
pub fn decode_region(data: &[u8]) -> Result<Vec<Contact>, CodecError> {
    check_region_size(RegionId::Contacts, data)?;
    let mut contacts = Vec::new();
    for slot in 0..RegionId::Contacts.info().count {
        let record = &data[slot * CONTACT_SIZE..(slot + 1) * CONTACT_SIZE];
        if let Some(contact) = decode_slot(slot, record)? {
            contacts.push(contact);
        }
    }
    Ok(contacts)
}

/// Rebuild the contact region: every entity at its own slot, the rest 0xFF.
pub fn encode_region(contacts: &[Contact], data: &mut [u8]) -> Result<(), CodecError> {
    check_region_size(RegionId::Contacts, data)?;
    data.fill(0xFF);
    for contact in contacts {
        let slot = contact.index as usize;
        check_slot(RegionId::Contacts, slot)?;
        data[slot * CONTACT_SIZE..(slot + 1) * CONTACT_SIZE].copy_from_slice(&encode(contact));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let contact = Contact::new(17, "Bob", ContactKind::Private, 3114321);
        let record = encode(&contact);
        let decoded = decode_slot(17, &record).unwrap().unwrap();
        assert_eq!(decoded, contact);
        // DMR ID lands as BCD at 0x02
        assert_eq!(&record[0x02..0x06], &[0x21, 0x43, 0x11, 0x03]);
    }

    #[test]
    fn test_bad_type_is_malformed() {
        let mut record = [0xFFu8; CONTACT_SIZE];
        record[0x00] = 0x01;
        record[0x01] = 0x05;
        let err = decode_slot(2, &record).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MalformedRecord { region: RegionId::Contacts, slot: 2, .. }
        ));
    }

    #[test]
    fn test_empty_markers() {
        let mut record = [0xFFu8; CONTACT_SIZE];
        assert!(decode_slot(0, &record).unwrap().is_none());
        record[0x00] = 0x00;
        assert!(decode_slot(0, &record).unwrap().is_none());
    }

    #[test]
    fn test_reserved_bytes_survive() {
        let mut record = [0xFFu8; CONTACT_SIZE];
        record[0x00] = 0x03;
        record[0x01] = 0x01;
        record[0x02..0x06].copy_from_slice(&int_to_bcd4(91));
        record[0x06..0x10].copy_from_slice(&[9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        record[0x10..0x20].copy_from_slice(&encode_fixed_str("TG 91", 16));

        let contact = decode_slot(2, &record).unwrap().unwrap();
        assert_eq!(encode(&contact), record);
    }

    #[test]
    fn test_region_slot_stability() {
        let mut data = vec![0xFF; RegionId::Contacts.info().payload_size()];
        let contacts = vec![
            Contact::new(0, "First", ContactKind::Group, 1),
            Contact::new(2047, "Last", ContactKind::AllCall, 16777215),
        ];
        encode_region(&contacts, &mut data).unwrap();
        assert_eq!(decode_region(&data).unwrap(), contacts);
    }
}
