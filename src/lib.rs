// RT4D-RS: Rust codeplug editor core for the Radtel RT-4D
// Copyright 2025 - Licensed under GPLv3

pub mod addressbook;
pub mod bitwise;
pub mod codec;
pub mod flash;
pub mod formats;
pub mod memmap;
pub mod models;
pub mod protocol;
pub mod serial;

// Re-export commonly used types
pub use addressbook::{AddressBook, GlobalContact};
pub use codec::CodecError;
pub use flash::{flash_regions, RegionResult, RegionStatus};
pub use formats::{load_rdmf, save_rdmf};
pub use memmap::{image::CodeplugImage, region::RegionId};
pub use models::{
    Channel, Contact, EncryptionKey, FmSettings, GroupList, Message, RadioSettings, Zone,
};
pub use protocol::{ProtocolError, Session};
pub use serial::{SerialConfig, SerialLink, SerialPort};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
