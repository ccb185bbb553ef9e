// Record codecs for each codeplug region
//
// Every codec follows the same contract: `decode_region` walks the slots of
// a region slice and yields one entity per occupied slot, carrying the slot
// number on the entity; `encode_region` rebuilds the slice with each entity
// written back to its own slot and absent slots blanked to 0xFF. Entities
// never move slots on a round trip, so references between regions (channels
// to contacts, zones to channels) stay valid.
//
// Settings and FM are patch codecs: their regions contain firmware state at
// offsets this tool does not interpret, so encode writes known fields into
// the existing bytes instead of rebuilding the record.

pub mod channel;
pub mod contact;
pub mod encryption;
pub mod fm;
pub mod grouplist;
pub mod message;
pub mod settings;
pub mod zone;

use thiserror::Error;

use crate::memmap::region::RegionId;

#[derive(Debug, Error)]
pub enum CodecError {
    /// A structurally occupied slot carries a kind byte outside the known
    /// enumeration. Reported rather than silently coerced so a corrupt
    /// image never round-trips into a subtly different one.
    #[error("malformed {region} record in slot {slot}: {reason}")]
    MalformedRecord {
        region: RegionId,
        slot: usize,
        reason: String,
    },

    #[error("{region} region slice is {actual} bytes, expected {expected}")]
    RegionSize {
        region: RegionId,
        expected: usize,
        actual: usize,
    },

    #[error("slot {slot} out of range for {region} ({count} slots)")]
    SlotOutOfRange {
        region: RegionId,
        slot: usize,
        count: usize,
    },
}

/// Check a region slice against the region's payload size.
pub(crate) fn check_region_size(region: RegionId, data: &[u8]) -> Result<(), CodecError> {
    let expected = region.info().payload_size();
    if data.len() != expected {
        return Err(CodecError::RegionSize {
            region,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Check a slot index against the region's slot count.
pub(crate) fn check_slot(region: RegionId, slot: usize) -> Result<(), CodecError> {
    let count = region.info().count;
    if slot >= count {
        return Err(CodecError::SlotOutOfRange {
            region,
            slot,
            count,
        });
    }
    Ok(())
}
