// Wire framing for the RT-4D UART protocol
//
// Every multi-byte frame ends in an additive checksum: the low byte of the
// sum of everything before it. Block transfers move 1 KiB of payload in a
// 1028-byte packet with a 3-byte header.

/// ACK byte the radio returns for accepted commands and packets.
pub const ACK: u8 = 0x06;

/// Address-book response: flash IC capacity mismatch.
pub const RESP_CAPACITY_MISMATCH: u8 = 0xA4;

/// Address-book response: flash IC capacity limit reached.
pub const RESP_CAPACITY_LIMIT: u8 = 0x4A;

/// Payload bytes per block transfer.
pub const BLOCK_SIZE: usize = 1024;

/// Full block packet: 3-byte header, 1 KiB payload, checksum.
pub const BLOCK_PACKET_SIZE: usize = BLOCK_SIZE + 4;

const CMD_NOTIFY: u8 = 0x34;
const CMD_READ_BLOCK: u8 = 0x52;
const CMD_ADDRESS_BOOK: u8 = 0xA4;

/// Fixed close frame; its checksum byte is part of the constant.
pub const CLOSE_COMMAND: [u8; 5] = [0x34, 0x52, 0x05, 0xEE, 0x79];

/// Checksum over everything except the trailing checksum byte.
pub fn checksum(frame: &[u8]) -> u8 {
    frame[..frame.len() - 1]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Check a received frame's trailing checksum.
pub fn verify(frame: &[u8]) -> bool {
    !frame.is_empty() && checksum(frame) == frame[frame.len() - 1]
}

fn seal(mut frame: [u8; 5]) -> [u8; 5] {
    frame[4] = checksum(&frame);
    frame
}

/// The notify command that opens a programming session.
pub fn notify_command() -> [u8; 5] {
    seal([CMD_NOTIFY, 0x00, 0x00, 0x10, 0x00])
}

/// Read one 1 KiB block of SPI flash; the offset is in KiB units.
pub fn read_block_command(kb_offset: u16) -> [u8; 4] {
    let mut frame = [
        CMD_READ_BLOCK,
        (kb_offset >> 8) as u8,
        kb_offset as u8,
        0x00,
    ];
    frame[3] = checksum(&frame);
    frame
}

/// Write one block into a region. `data` is at most `BLOCK_SIZE` bytes;
/// short blocks are padded with 0xFF.
pub fn write_block_packet(region: u8, block: u16, data: &[u8]) -> [u8; BLOCK_PACKET_SIZE] {
    let mut packet = [0xFFu8; BLOCK_PACKET_SIZE];
    packet[0] = region;
    packet[1] = (block >> 8) as u8;
    packet[2] = block as u8;
    let take = data.len().min(BLOCK_SIZE);
    packet[3..3 + take].copy_from_slice(&data[..take]);
    packet[BLOCK_PACKET_SIZE - 1] = checksum(&packet);
    packet
}

/// One block of an address-book upload.
pub fn address_book_packet(block: u16, data: &[u8]) -> [u8; BLOCK_PACKET_SIZE] {
    write_block_packet(CMD_ADDRESS_BOOK, block, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_additive_low_byte() {
        assert_eq!(checksum(&[0x34, 0x00, 0x00, 0x10, 0x00]), 0x44);
        assert_eq!(checksum(&[0xFF, 0xFF, 0x03, 0x00]), 0x01);
    }

    #[test]
    fn test_notify_command() {
        assert_eq!(notify_command(), [0x34, 0x00, 0x00, 0x10, 0x44]);
    }

    #[test]
    fn test_close_command_is_self_consistent() {
        assert!(verify(&CLOSE_COMMAND));
    }

    #[test]
    fn test_read_block_command() {
        let cmd = read_block_command(0x0102);
        assert_eq!(cmd[0], 0x52);
        assert_eq!(cmd[1], 0x01);
        assert_eq!(cmd[2], 0x02);
        assert_eq!(cmd[3], checksum(&cmd));
    }

    #[test]
    fn test_write_packet_pads_short_blocks() {
        let packet = write_block_packet(0x94, 8, &[0xAA; 512]);
        assert_eq!(packet[0], 0x94);
        assert_eq!(packet[1], 0x00);
        assert_eq!(packet[2], 0x08);
        assert_eq!(packet[3], 0xAA);
        assert_eq!(packet[3 + 511], 0xAA);
        assert_eq!(packet[3 + 512], 0xFF);
        assert!(verify(&packet));
    }

    #[test]
    fn test_verify_rejects_corruption() {
        let mut packet = write_block_packet(0x91, 0, &[0u8; 1024]);
        assert!(verify(&packet));
        packet[10] ^= 0x01;
        assert!(!verify(&packet));
    }
}
