// In-memory codeplug image
//
// A `CodeplugImage` wraps the raw 275,456-byte flash image and hands out
// typed views of each region through the codec layer. Mutating accessors
// mark the region dirty, so a caller can flash only the regions that
// actually changed.

use std::collections::HashSet;

use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::memmap::region::{RegionId, CODEPLUG_SIZE, REGIONS};
use crate::models::{
    Channel, Contact, EncryptionKey, FmSettings, GroupList, RadioSettings, Zone,
};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("codeplug image is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("region {0} is device-only and has no slot in a codeplug image")]
    DeviceOnly(RegionId),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone)]
pub struct CodeplugImage {
    data: Vec<u8>,
    dirty: HashSet<RegionId>,
}

impl CodeplugImage {
    /// Wrap a raw image, rejecting anything but the exact file size.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() != CODEPLUG_SIZE {
            return Err(ImageError::SizeMismatch {
                expected: CODEPLUG_SIZE,
                actual: data.len(),
            });
        }
        Ok(CodeplugImage {
            data,
            dirty: HashSet::new(),
        })
    }

    /// A blank image the radio will accept: all slots empty, default
    /// settings patched in so the CFG signature is present.
    pub fn factory_fresh() -> Self {
        let mut image = CodeplugImage {
            data: vec![0xFF; CODEPLUG_SIZE],
            dirty: HashSet::new(),
        };
        // cannot fail on a correctly sized buffer
        let _ = image.set_settings(&RadioSettings::default());
        image.dirty.clear();
        image
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn region_range(&self, region: RegionId) -> Result<std::ops::Range<usize>, ImageError> {
        let info = region.info();
        let offset = info.image_offset.ok_or(ImageError::DeviceOnly(region))?;
        Ok(offset..offset + info.payload_size())
    }

    /// The raw payload bytes of a file-backed region.
    pub fn region_bytes(&self, region: RegionId) -> Result<&[u8], ImageError> {
        let range = self.region_range(region)?;
        Ok(&self.data[range])
    }

    /// Mutable payload bytes; the region is marked dirty.
    pub fn region_bytes_mut(&mut self, region: RegionId) -> Result<&mut [u8], ImageError> {
        let range = self.region_range(region)?;
        self.dirty.insert(region);
        Ok(&mut self.data[range])
    }

    /// Regions touched since the last `clear_dirty`, in region-map order.
    pub fn dirty_regions(&self) -> Vec<RegionId> {
        REGIONS
            .iter()
            .map(|r| r.id)
            .filter(|id| self.dirty.contains(id))
            .collect()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    pub fn channels(&self) -> Result<Vec<Channel>, ImageError> {
        Ok(codec::channel::decode_region(self.region_bytes(RegionId::Channels)?)?)
    }

    pub fn set_channels(&mut self, channels: &[Channel]) -> Result<(), ImageError> {
        codec::channel::encode_region(channels, self.region_bytes_mut(RegionId::Channels)?)?;
        Ok(())
    }

    pub fn contacts(&self) -> Result<Vec<Contact>, ImageError> {
        Ok(codec::contact::decode_region(self.region_bytes(RegionId::Contacts)?)?)
    }

    pub fn set_contacts(&mut self, contacts: &[Contact]) -> Result<(), ImageError> {
        codec::contact::encode_region(contacts, self.region_bytes_mut(RegionId::Contacts)?)?;
        Ok(())
    }

    pub fn zones(&self) -> Result<Vec<Zone>, ImageError> {
        Ok(codec::zone::decode_region(self.region_bytes(RegionId::Zones)?)?)
    }

    pub fn set_zones(&mut self, zones: &[Zone]) -> Result<(), ImageError> {
        codec::zone::encode_region(zones, self.region_bytes_mut(RegionId::Zones)?)?;
        Ok(())
    }

    pub fn group_lists(&self) -> Result<Vec<GroupList>, ImageError> {
        Ok(codec::grouplist::decode_region(self.region_bytes(RegionId::GroupLists)?)?)
    }

    pub fn set_group_lists(&mut self, lists: &[GroupList]) -> Result<(), ImageError> {
        codec::grouplist::encode_region(lists, self.region_bytes_mut(RegionId::GroupLists)?)?;
        Ok(())
    }

    pub fn encryption_keys(&self) -> Result<Vec<EncryptionKey>, ImageError> {
        Ok(codec::encryption::decode_region(
            self.region_bytes(RegionId::EncryptionKeys)?,
        )?)
    }

    pub fn set_encryption_keys(&mut self, keys: &[EncryptionKey]) -> Result<(), ImageError> {
        codec::encryption::encode_region(keys, self.region_bytes_mut(RegionId::EncryptionKeys)?)?;
        Ok(())
    }

    pub fn settings(&self) -> Result<RadioSettings, ImageError> {
        Ok(codec::settings::decode(self.region_bytes(RegionId::Settings)?)?)
    }

    pub fn set_settings(&mut self, settings: &RadioSettings) -> Result<(), ImageError> {
        codec::settings::encode_into(settings, self.region_bytes_mut(RegionId::Settings)?)?;
        Ok(())
    }

    pub fn fm_settings(&self) -> Result<FmSettings, ImageError> {
        Ok(codec::fm::decode(self.region_bytes(RegionId::FmSettings)?)?)
    }

    pub fn set_fm_settings(&mut self, fm: &FmSettings) -> Result<(), ImageError> {
        codec::fm::encode_into(fm, self.region_bytes_mut(RegionId::FmSettings)?)?;
        Ok(())
    }
}
