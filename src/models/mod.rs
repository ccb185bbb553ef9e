// Structured codeplug entities
//
// These are the editor-facing types produced by the codec layer. They are
// plain values: decode creates them, the caller mutates them, and commit
// re-encodes them into the image. Reserved bytes the firmware defines but
// this tool does not interpret are carried verbatim so a decode/encode
// cycle is lossless.

pub mod channel;
pub mod contact;
pub mod encryption;
pub mod fm;
pub mod grouplist;
pub mod message;
pub mod settings;
pub mod zone;

pub use channel::{
    AnalogChannel, Channel, ChannelConfig, DigitalChannel, Frequency, Modulation, PowerLevel,
    ScanMode,
};
pub use contact::{Contact, ContactKind};
pub use encryption::{EncryptionKey, EncryptionType};
pub use fm::{FmPreset, FmSettings};
pub use grouplist::GroupList;
pub use message::{CallType, Message, MessageKind, MessageTimestamp};
pub use settings::{ClockTimer, DtmfSettings, FreqLockRange, RadioSettings};
pub use zone::Zone;
