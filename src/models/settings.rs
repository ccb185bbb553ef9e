// Radio-wide settings (4 KiB CFG region)
//
// The CFG region is mostly sparse: known fields sit at fixed offsets with
// unknown firmware state in between. The codec therefore patches fields
// into the existing region bytes instead of rebuilding the record, and this
// model only carries the interpreted fields.

use serde::{Deserialize, Serialize};

/// One of the four programmable clock timers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTimer {
    pub mode: u8,
    pub hour: u8,
    pub minute: u8,
}

/// One of the four TX frequency lock ranges. Bounds are in MHz.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreqLockRange {
    pub mode: u8,
    pub start: u16,
    pub end: u16,
}

/// DTMF signalling configuration, including the 20 stored codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtmfSettings {
    pub send_delay: u8,
    pub send_duration: u8,
    pub send_interval: u8,
    pub send_mode: u8,
    pub send_select: u8,
    pub display_enable: u8,
    pub gain: u8,
    pub decode_threshold: u8,
    pub remote_control: u8,
    pub remote_call_time: u8,
    /// The 20 stored DTMF code strings (16 bytes each on the wire).
    pub codes: Vec<String>,
}

impl Default for DtmfSettings {
    fn default() -> Self {
        DtmfSettings {
            send_delay: 0,
            send_duration: 0,
            send_interval: 0,
            send_mode: 0,
            send_select: 0,
            display_enable: 0,
            gain: 0,
            decode_threshold: 0,
            remote_control: 0,
            remote_call_time: 0,
            codes: vec![String::new(); 20],
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioSettings {
    // Identity
    pub startup_password: String,
    pub startup_message: String,
    pub radio_name: String,
    pub radio_id: u32,

    // Audio / UI
    pub voice_prompt: u8,
    pub key_beep: u8,
    pub key_lock: u8,
    pub lock_timer: u8,

    // Display
    pub led_on_off: u8,
    pub backlight_brightness: u8,
    pub led_timer: u8,
    pub menu_timer: u8,
    pub display_mode_a: u8,
    pub display_mode_b: u8,
    pub lcd_contrast: u8,
    pub display_lines: u8,
    pub dual_display_mode: u8,

    // Power
    pub power_save_mode: u8,
    pub power_save_start: u8,
    pub apo_enabled: bool,

    // Operation
    pub dual_watch: u8,
    pub talkaround: u8,
    pub alarm_type: u8,
    pub tx_priority: u8,
    pub main_ptt: u8,
    pub vfo_step: u8,
    pub main_band: u8,
    pub work_mode_a: u8,
    pub zone_a: u8,
    pub channel_a: u16,
    pub work_mode_b: u8,
    pub zone_b: u8,
    pub channel_b: u16,

    pub clocks: [ClockTimer; 4],

    // Startup / boot
    pub startup_picture: u8,
    pub tx_protection: u8,
    pub startup_beep: u8,
    pub startup_label: u8,
    pub startup_display_line: u16,
    pub startup_display_column: u16,
    pub password_enable: u8,
    /// Seconds since midnight on the radio clock.
    pub radio_time_seconds: u32,

    pub freq_locks: [FreqLockRange; 4],

    // Scan
    pub scan_direction: u8,
    pub scan_mode: u8,
    pub scan_return: u8,
    pub scan_dwell: u8,

    // Programmable keys
    pub key_fs1_short: u8,
    pub key_fs1_long: u8,
    pub key_fs2_short: u8,
    pub key_fs2_long: u8,
    pub key_alarm_short: u8,
    pub key_alarm_long: u8,
    /// Long-press actions for the digit keys 0..9.
    pub digit_keys: [u8; 10],

    // Audio levels
    pub tone_frequency: u16,
    pub squelch_level: u8,
    pub tx_mic_gain: u8,
    pub rx_speaker_volume: u8,
    pub tx_start_beep: u8,
    pub roger_beep: u8,
    pub call_mic_gain: u8,
    pub call_speaker_volume: u8,
    pub call_start_beep: u8,
    pub call_end_beep: u8,
    pub digital_squelch: u8,

    // DMR
    pub remote_control: u8,
    pub group_call_hang_time: u16,
    pub private_call_hang_time: u16,
    pub group_id_display: u8,
    pub call_timing_display: u8,

    // Advanced
    pub noaa_channel: u8,
    pub spectrum_scan_mode: u8,
    pub detection_range: u16,
    pub relay_delay: u8,
    pub glitch_filter: u8,

    pub dtmf: DtmfSettings,
}
