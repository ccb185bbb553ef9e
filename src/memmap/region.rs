// RT-4D region map
//
// Two address spaces share this table: the .4rdmf file layout (image_offset)
// and the radio's SPI flash layout (spi_region / spi_addr). The block-write
// protocol addresses SPI by region id plus block index, so the SPI address
// is informational; the region id is what goes on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Total size of a .4rdmf codeplug image in bytes (0x43400).
pub const CODEPLUG_SIZE: usize = 275_456;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionId {
    Settings,
    Channels,
    Contacts,
    GroupLists,
    EncryptionKeys,
    Zones,
    FmSettings,
    Messages,
}

#[derive(Debug, Clone, Copy)]
pub struct RegionInfo {
    pub id: RegionId,
    pub name: &'static str,
    /// Offset of this region in the codeplug file, `None` for device-only
    /// regions that never appear in a .4rdmf image.
    pub image_offset: Option<usize>,
    /// Record size in bytes.
    pub stride: usize,
    /// Number of record slots.
    pub count: usize,
    /// Region id byte used by the serial block-write command.
    pub spi_region: u8,
    /// Base address in SPI flash. Settings is the bank-0 address; firmware
    /// variants with dual settings banks may use 0x3000 instead.
    pub spi_addr: u32,
    /// Bytes reserved for the region in SPI flash.
    pub spi_size: usize,
}

impl RegionInfo {
    /// Payload size of the region: the populated record area, which can be
    /// smaller than the space the file or SPI map reserves for it.
    pub fn payload_size(&self) -> usize {
        self.stride * self.count
    }
}

/// All regions in fixed declaration order. Flash and verify operations walk
/// this order regardless of how the caller lists regions.
pub static REGIONS: [RegionInfo; 8] = [
    RegionInfo {
        id: RegionId::Settings,
        name: "settings",
        image_offset: Some(0x00000),
        stride: 4096,
        count: 1,
        spi_region: 0x90,
        spi_addr: 0x002000,
        spi_size: 0x1000,
    },
    RegionInfo {
        id: RegionId::Channels,
        name: "channels",
        image_offset: Some(0x01000),
        stride: 48,
        count: 1024,
        spi_region: 0x91,
        spi_addr: 0x004000,
        spi_size: 0xC000,
    },
    RegionInfo {
        id: RegionId::Contacts,
        name: "contacts",
        image_offset: Some(0x0D000),
        stride: 32,
        count: 2048,
        spi_region: 0x93,
        spi_addr: 0x05C000,
        spi_size: 0x10000,
    },
    RegionInfo {
        id: RegionId::GroupLists,
        name: "grouplists",
        image_offset: Some(0x1D000),
        stride: 272,
        count: 32,
        spi_region: 0x94,
        spi_addr: 0x07C000,
        spi_size: 0x3000,
    },
    RegionInfo {
        id: RegionId::EncryptionKeys,
        name: "encryption",
        image_offset: Some(0x20000),
        stride: 48,
        count: 256,
        spi_region: 0x95,
        spi_addr: 0x082000,
        spi_size: 0x3000,
    },
    RegionInfo {
        id: RegionId::Zones,
        name: "zones",
        image_offset: Some(0x23000),
        stride: 512,
        count: 256,
        spi_region: 0x92,
        spi_addr: 0x01C000,
        spi_size: 0x20000,
    },
    RegionInfo {
        id: RegionId::FmSettings,
        name: "fm",
        image_offset: Some(0x43000),
        stride: 1024,
        count: 1,
        spi_region: 0x99,
        spi_addr: 0x0D6000,
        spi_size: 0x1000,
    },
    RegionInfo {
        id: RegionId::Messages,
        name: "messages",
        image_offset: None,
        stride: 256,
        count: 16,
        spi_region: 0x97,
        spi_addr: 0x094000,
        spi_size: 0x1000,
    },
];

#[derive(Debug, Error)]
#[error("unknown region name: {0:?}")]
pub struct UnknownRegion(pub String);

impl RegionId {
    pub fn info(self) -> &'static RegionInfo {
        // REGIONS holds exactly one entry per variant
        REGIONS
            .iter()
            .find(|r| r.id == self)
            .unwrap_or(&REGIONS[0])
    }

    /// Look a region up by its command-line name.
    pub fn from_name(name: &str) -> Result<Self, UnknownRegion> {
        REGIONS
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
            .map(|r| r.id)
            .ok_or_else(|| UnknownRegion(name.to_string()))
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().name)
    }
}
