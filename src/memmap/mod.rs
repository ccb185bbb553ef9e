// Codeplug memory layout: the region map and the in-memory image

pub mod image;
pub mod region;

pub use image::CodeplugImage;
pub use region::{RegionId, RegionInfo, UnknownRegion, CODEPLUG_SIZE, REGIONS};
