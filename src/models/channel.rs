// Memory channel model
//
// A channel record is 48 bytes. Byte 0x02 selects the mode: 0x00 digital
// (DMR), 0x01 analog. The two modes overlay different fields onto the same
// offsets, so the model splits them into a `ChannelConfig` enum while the
// shared fields (frequencies, power, name) live on `Channel` itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bitwise::SubAudio;

/// A frequency in the radio's native unit of 10 Hz (MHz x 100,000).
///
/// `0xFFFF_FFFF` means "unset" and is passed through untouched so empty
/// fields survive a decode/encode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency(pub u32);

impl Frequency {
    pub const UNSET: Frequency = Frequency(0xFFFF_FFFF);

    pub fn from_mhz(mhz: f64) -> Self {
        Frequency((mhz * 100_000.0).round() as u32)
    }

    /// The frequency in MHz, or `None` for the unset sentinel.
    pub fn mhz(self) -> Option<f64> {
        if self == Self::UNSET {
            None
        } else {
            Some(self.0 as f64 / 100_000.0)
        }
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mhz() {
            Some(mhz) => write!(f, "{:.5}", mhz),
            None => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerLevel {
    Low,
    High,
}

/// Scan list membership flag (byte 0x13 on digital channels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    Add,
    Remove,
}

/// Analog carrier modulation (byte 0x00 on analog channels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modulation {
    Fm,
    Am,
    Ssb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Zero-based slot in the channel region (0..1023).
    pub index: u16,
    pub name: String,
    pub enabled: bool,
    pub rx_freq: Frequency,
    pub tx_freq: Frequency,
    pub power: PowerLevel,
    pub tx_priority: u8,
    pub config: ChannelConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelConfig {
    Digital(DigitalChannel),
    Analog(AnalogChannel),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalChannel {
    /// Use the per-channel DMR ID instead of the radio-wide one.
    pub use_channel_id: bool,
    /// Per-channel DMR ID, used when `use_channel_id` is set.
    pub dmr_id: u32,
    pub time_slot: u8,
    pub color_code: u8,
    /// 0 = simplex, 1 = repeater, 2 = direct dual-slot.
    pub dmr_mode: u8,
    pub monitor: u8,
    pub scan: ScanMode,
    /// TX timeout in 30 s steps, 0 = off.
    pub tot: u8,
    pub alarm: u8,
    /// One-based group list reference, 0 = none.
    pub group_list: u16,
    /// One-based contact reference, 0 = none.
    pub contact: u16,
    /// One-based encryption key reference, 0 = none.
    pub encrypt_key: u16,
    pub reserved_0f: u8,
    pub reserved_12: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalogChannel {
    pub modulation: Modulation,
    /// 0 = 12.5 kHz, 1 = 25 kHz.
    pub bandwidth: u8,
    pub rx_tone: SubAudio,
    pub tx_tone: SubAudio,
    /// TX timeout in 30 s steps, 0 = off (5-bit field).
    pub tot: u8,
    pub ctdcs_select: u8,
    pub tail_tone: u8,
    pub scramble: u8,
    pub encrypted_code_1: u32,
    pub encrypted_code_2: u32,
    pub encrypted_code_3: u32,
}

impl Channel {
    /// A fresh digital channel with the firmware's defaults.
    pub fn new_digital(index: u16, name: &str, rx_freq: Frequency, tx_freq: Frequency) -> Self {
        Channel {
            index,
            name: name.to_string(),
            enabled: true,
            rx_freq,
            tx_freq,
            power: PowerLevel::High,
            tx_priority: 0,
            config: ChannelConfig::Digital(DigitalChannel {
                use_channel_id: false,
                dmr_id: 0,
                time_slot: 0,
                color_code: 1,
                dmr_mode: 0,
                monitor: 0,
                scan: ScanMode::Add,
                tot: 0,
                alarm: 0,
                group_list: 0,
                contact: 0,
                encrypt_key: 0,
                reserved_0f: 0,
                reserved_12: 0,
            }),
        }
    }

    /// A fresh analog FM channel with the firmware's defaults.
    pub fn new_analog(index: u16, name: &str, rx_freq: Frequency, tx_freq: Frequency) -> Self {
        Channel {
            index,
            name: name.to_string(),
            enabled: true,
            rx_freq,
            tx_freq,
            power: PowerLevel::High,
            tx_priority: 0,
            config: ChannelConfig::Analog(AnalogChannel {
                modulation: Modulation::Fm,
                bandwidth: 0,
                rx_tone: SubAudio::None,
                tx_tone: SubAudio::None,
                tot: 0,
                ctdcs_select: 0,
                tail_tone: 0,
                scramble: 0,
                encrypted_code_1: 0,
                encrypted_code_2: 0,
                encrypted_code_3: 0,
            }),
        }
    }

    pub fn is_digital(&self) -> bool {
        matches!(self.config, ChannelConfig::Digital(_))
    }
}
