// RT-4D UART protocol
//
// Three layers: `frame` builds and checks the wire packets, `uart` drives
// the block-level commands over a `SerialLink`, and `session` owns a probed
// radio connection with its detected firmware layout.

pub mod frame;
pub mod session;
pub mod uart;

use thiserror::Error;

use crate::addressbook::AddressBookError;
use crate::codec::CodecError;
use crate::memmap::image::ImageError;
use crate::serial::SerialError;

pub use session::{probe_any, FirmwareVariant, Session};
pub use uart::{Rt4dUart, StatusCallback};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Serial(#[from] SerialError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    AddressBook(#[from] AddressBookError),

    #[error("radio did not acknowledge (response 0x{0:02X})")]
    Nak(u8),

    #[error("block read at byte offset {offset} failed integrity check after retries")]
    ReadIntegrity { offset: usize },

    #[error("radio is in bootloader mode; power it on normally and retry")]
    Bootloader,

    #[error("firmware layout not recognized; no settings bank marker or CFG signature found")]
    UnsupportedFirmware,

    #[error("flash IC capacity mismatch")]
    CapacityMismatch,

    #[error("flash IC capacity limit reached")]
    CapacityExceeded,

    #[error("no radio answered on any serial port")]
    NoDeviceFound,

    #[error("operation cancelled after {completed} complete blocks")]
    Cancelled { completed: usize },
}
