// Radio settings codec (4 KiB CFG region)
//
// Known fields live at fixed offsets with uninterpreted firmware state in
// between, so this is a patch codec: `encode_into` writes the known fields
// over the existing region bytes and leaves everything else untouched.

use crate::bitwise::{bcd4_to_int, decode_fixed_str, encode_fixed_str, int_to_bcd4};
use crate::memmap::region::RegionId;
use crate::models::{ClockTimer, DtmfSettings, FreqLockRange, RadioSettings};

use super::{check_region_size, CodecError};

// CFG signature bytes the firmware checks before accepting the region.
pub const MAGIC_OFFSET: usize = 12;
pub const MAGIC: [u8; 2] = [0xCD, 0xAB];

const DTMF_CODE_COUNT: usize = 20;
const DTMF_CODE_BASE: usize = 522;
const DTMF_CODE_LEN: usize = 16;

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn write_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Decode the CFG region into a settings model.
pub fn decode(data: &[u8]) -> Result<RadioSettings, CodecError> {
    check_region_size(RegionId::Settings, data)?;

    let mut clocks = [ClockTimer::default(); 4];
    for (i, clock) in clocks.iter_mut().enumerate() {
        let base = 110 + i * 3;
        *clock = ClockTimer {
            mode: data[base],
            hour: data[base + 1],
            minute: data[base + 2],
        };
    }

    let mut freq_locks = [FreqLockRange::default(); 4];
    for (i, lock) in freq_locks.iter_mut().enumerate() {
        let base = 142 + i * 5;
        *lock = FreqLockRange {
            mode: data[base],
            start: read_u16(data, base + 1),
            end: read_u16(data, base + 3),
        };
    }

    let mut digit_keys = [0u8; 10];
    digit_keys.copy_from_slice(&data[176..186]);

    let mut codes = Vec::with_capacity(DTMF_CODE_COUNT);
    for i in 0..DTMF_CODE_COUNT {
        let base = DTMF_CODE_BASE + i * DTMF_CODE_LEN;
        codes.push(decode_fixed_str(&data[base..base + DTMF_CODE_LEN]));
    }

    Ok(RadioSettings {
        startup_password: decode_fixed_str(&data[28..44]),
        startup_message: decode_fixed_str(&data[44..76]),
        radio_name: decode_fixed_str(&data[76..92]),
        radio_id: bcd4_to_int(&[data[384], data[385], data[386], data[387]]),

        voice_prompt: data[92],
        key_beep: data[93],
        key_lock: data[94],
        lock_timer: data[95],

        led_on_off: data[96],
        backlight_brightness: data[97],
        led_timer: data[98],
        menu_timer: data[101],
        display_mode_a: data[133],
        display_mode_b: data[138],
        lcd_contrast: data[233],
        display_lines: data[234],
        dual_display_mode: data[235],

        power_save_mode: data[99],
        power_save_start: data[100],
        apo_enabled: data[105] == 1,

        dual_watch: data[102],
        talkaround: data[103],
        alarm_type: data[104],
        tx_priority: data[126],
        main_ptt: data[127],
        vfo_step: data[128],
        main_band: data[131],
        work_mode_a: data[132],
        zone_a: data[134],
        channel_a: read_u16(data, 135),
        work_mode_b: data[137],
        zone_b: data[139],
        channel_b: read_u16(data, 140),

        clocks,

        startup_picture: data[16],
        tx_protection: data[17],
        startup_beep: data[19],
        startup_label: data[20],
        startup_display_line: read_u16(data, 23),
        startup_display_column: read_u16(data, 25),
        password_enable: data[27],
        radio_time_seconds: u32::from_le_bytes([data[106], data[107], data[108], data[109]]),

        freq_locks,

        scan_direction: data[162],
        scan_mode: data[163],
        scan_return: data[164],
        scan_dwell: data[165],

        key_fs1_short: data[170],
        key_fs1_long: data[171],
        key_fs2_short: data[172],
        key_fs2_long: data[173],
        key_alarm_short: data[174],
        key_alarm_long: data[175],
        digit_keys,

        tone_frequency: read_u16(data, 256),
        squelch_level: data[258],
        tx_mic_gain: data[261],
        rx_speaker_volume: data[262],
        tx_start_beep: data[267],
        roger_beep: data[268],
        call_mic_gain: data[391],
        call_speaker_volume: data[392],
        call_start_beep: data[397],
        call_end_beep: data[398],
        digital_squelch: data[403],

        remote_control: data[388],
        group_call_hang_time: read_u16(data, 389),
        private_call_hang_time: read_u16(data, 395),
        group_id_display: data[400],
        call_timing_display: data[404],

        noaa_channel: data[272],
        spectrum_scan_mode: data[273],
        detection_range: read_u16(data, 274),
        relay_delay: data[276],
        glitch_filter: data[842],

        dtmf: DtmfSettings {
            send_delay: data[512],
            send_duration: data[513],
            send_interval: data[514],
            send_mode: data[515],
            send_select: data[516],
            display_enable: data[517],
            gain: data[518],
            decode_threshold: data[519],
            remote_control: data[520],
            remote_call_time: data[521],
            codes,
        },
    })
}

/// Patch the settings model into the CFG region, preserving all bytes at
/// offsets this codec does not interpret.
pub fn encode_into(settings: &RadioSettings, data: &mut [u8]) -> Result<(), CodecError> {
    check_region_size(RegionId::Settings, data)?;

    data[MAGIC_OFFSET..MAGIC_OFFSET + 2].copy_from_slice(&MAGIC);

    data[28..44].copy_from_slice(&encode_fixed_str(&settings.startup_password, 16));
    data[44..76].copy_from_slice(&encode_fixed_str(&settings.startup_message, 32));
    data[76..92].copy_from_slice(&encode_fixed_str(&settings.radio_name, 16));
    data[384..388].copy_from_slice(&int_to_bcd4(settings.radio_id));

    data[92] = settings.voice_prompt;
    data[93] = settings.key_beep;
    data[94] = settings.key_lock;
    data[95] = settings.lock_timer;

    data[96] = settings.led_on_off;
    data[97] = settings.backlight_brightness;
    data[98] = settings.led_timer;
    data[101] = settings.menu_timer;
    data[133] = settings.display_mode_a;
    data[138] = settings.display_mode_b;
    data[233] = settings.lcd_contrast;
    data[234] = settings.display_lines;
    data[235] = settings.dual_display_mode;

    data[99] = settings.power_save_mode;
    data[100] = settings.power_save_start;
    data[105] = settings.apo_enabled as u8;

    data[102] = settings.dual_watch;
    data[103] = settings.talkaround;
    data[104] = settings.alarm_type;
    data[126] = settings.tx_priority;
    data[127] = settings.main_ptt;
    data[128] = settings.vfo_step;
    data[131] = settings.main_band;
    data[132] = settings.work_mode_a;
    data[134] = settings.zone_a;
    write_u16(data, 135, settings.channel_a);
    data[137] = settings.work_mode_b;
    data[139] = settings.zone_b;
    write_u16(data, 140, settings.channel_b);

    for (i, clock) in settings.clocks.iter().enumerate() {
        let base = 110 + i * 3;
        data[base] = clock.mode;
        data[base + 1] = clock.hour;
        data[base + 2] = clock.minute;
    }

    data[16] = settings.startup_picture;
    data[17] = settings.tx_protection;
    data[19] = settings.startup_beep;
    data[20] = settings.startup_label;
    write_u16(data, 23, settings.startup_display_line);
    write_u16(data, 25, settings.startup_display_column);
    data[27] = settings.password_enable;
    data[106..110].copy_from_slice(&settings.radio_time_seconds.to_le_bytes());

    for (i, lock) in settings.freq_locks.iter().enumerate() {
        let base = 142 + i * 5;
        data[base] = lock.mode;
        write_u16(data, base + 1, lock.start);
        write_u16(data, base + 3, lock.end);
    }

    data[162] = settings.scan_direction;
    data[163] = settings.scan_mode;
    data[164] = settings.scan_return;
    data[165] = settings.scan_dwell;

    data[170] = settings.key_fs1_short;
    data[171] = settings.key_fs1_long;
    data[172] = settings.key_fs2_short;
    data[173] = settings.key_fs2_long;
    data[174] = settings.key_alarm_short;
    data[175] = settings.key_alarm_long;
    data[176..186].copy_from_slice(&settings.digit_keys);

    write_u16(data, 256, settings.tone_frequency);
    data[258] = settings.squelch_level;
    data[261] = settings.tx_mic_gain;
    data[262] = settings.rx_speaker_volume;
    data[267] = settings.tx_start_beep;
    data[268] = settings.roger_beep;
    data[391] = settings.call_mic_gain;
    data[392] = settings.call_speaker_volume;
    data[397] = settings.call_start_beep;
    data[398] = settings.call_end_beep;
    data[403] = settings.digital_squelch;

    data[388] = settings.remote_control;
    write_u16(data, 389, settings.group_call_hang_time);
    write_u16(data, 395, settings.private_call_hang_time);
    data[400] = settings.group_id_display;
    data[404] = settings.call_timing_display;

    data[272] = settings.noaa_channel;
    data[273] = settings.spectrum_scan_mode;
    write_u16(data, 274, settings.detection_range);
    data[276] = settings.relay_delay;
    data[842] = settings.glitch_filter;

    data[512] = settings.dtmf.send_delay;
    data[513] = settings.dtmf.send_duration;
    data[514] = settings.dtmf.send_interval;
    data[515] = settings.dtmf.send_mode;
    data[516] = settings.dtmf.send_select;
    data[517] = settings.dtmf.display_enable;
    data[518] = settings.dtmf.gain;
    data[519] = settings.dtmf.decode_threshold;
    data[520] = settings.dtmf.remote_control;
    data[521] = settings.dtmf.remote_call_time;
    for i in 0..DTMF_CODE_COUNT {
        let base = DTMF_CODE_BASE + i * DTMF_CODE_LEN;
        let code = settings.dtmf.codes.get(i).map(String::as_str).unwrap_or("");
        data[base..base + DTMF_CODE_LEN].copy_from_slice(&encode_fixed_str(code, DTMF_CODE_LEN));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_buf() -> Vec<u8> {
        vec![0x00; RegionId::Settings.info().payload_size()]
    }

    #[test]
    fn test_roundtrip() {
        let mut settings = RadioSettings {
            radio_name: "RT-4D".into(),
            startup_message: "hello".into(),
            radio_id: 2460001,
            squelch_level: 3,
            channel_a: 300,
            channel_b: 17,
            radio_time_seconds: 12 * 3600 + 34 * 60,
            group_call_hang_time: 3000,
            apo_enabled: true,
            ..Default::default()
        };
        settings.clocks[2] = ClockTimer { mode: 1, hour: 7, minute: 30 };
        settings.freq_locks[0] = FreqLockRange { mode: 1, start: 430, end: 440 };
        settings.dtmf.codes[4] = "1234*#".into();

        let mut data = region_buf();
        encode_into(&settings, &mut data).unwrap();
        assert_eq!(&data[12..14], &[0xCD, 0xAB]);

        let decoded = decode(&data).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_uninterpreted_bytes_preserved() {
        let mut data = region_buf();
        // firmware state between known fields
        data[200] = 0x5A;
        data[1000] = 0xA5;
        let settings = decode(&data).unwrap();
        encode_into(&settings, &mut data).unwrap();
        assert_eq!(data[200], 0x5A);
        assert_eq!(data[1000], 0xA5);
    }

    #[test]
    fn test_bad_region_size() {
        assert!(decode(&[0u8; 100]).is_err());
    }
}
