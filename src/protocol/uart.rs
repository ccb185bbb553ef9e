// Block-level UART engine
//
// Drives the notify/read/write/close commands over any `SerialLink`. All
// transfers move 1 KiB blocks; progress is reported and cancellation is
// checked at block boundaries only, so a cancelled operation never tears a
// block in half.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::serial::SerialLink;

use super::frame::{self, ACK, BLOCK_PACKET_SIZE, BLOCK_SIZE};
use super::ProtocolError;

/// Progress callback: (current, total, message).
pub type StatusCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Corrupted block reads are retried this many times before giving up.
const READ_RETRIES: usize = 3;

/// Block writes get one retry after a NAK.
const WRITE_ATTEMPTS: usize = 2;

/// Full SPI flash: 4096 blocks of 1 KiB.
const FULL_BACKUP_BLOCKS: usize = 4096;

/// Hard cap the firmware places on an address-book payload (28 MiB).
pub const ADDRESS_BOOK_MAX: usize = 29_360_124;

pub struct Rt4dUart<L: SerialLink> {
    link: L,
    status_fn: Option<StatusCallback>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<L: SerialLink> Rt4dUart<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            status_fn: None,
            cancel: None,
        }
    }

    pub fn set_status_fn(&mut self, status_fn: StatusCallback) {
        self.status_fn = Some(status_fn);
    }

    /// Install a cancellation token; setting it aborts the current
    /// operation at the next block boundary.
    pub fn set_cancel_token(&mut self, token: Arc<AtomicBool>) {
        self.cancel = Some(token);
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    fn status(&self, current: usize, total: usize, msg: &str) {
        if let Some(ref status_fn) = self.status_fn {
            status_fn(current, total, msg);
        }
    }

    /// `completed` is the number of fully-transferred blocks, which is
    /// also where a resumed operation would pick up.
    fn check_cancelled(&self, completed: usize) -> Result<(), ProtocolError> {
        match self.cancel {
            Some(ref token) if token.load(Ordering::Relaxed) => {
                Err(ProtocolError::Cancelled { completed })
            }
            _ => Ok(()),
        }
    }

    /// Open a programming session. The radio answers ACK when it is in
    /// normal mode and ready for block commands.
    pub async fn notify(&mut self) -> Result<(), ProtocolError> {
        self.link.write_all(&frame::notify_command()).await?;
        self.link.flush().await?;

        let mut response = [0u8; 1];
        self.link.read_exact(&mut response).await?;
        if response[0] != ACK {
            return Err(ProtocolError::Nak(response[0]));
        }
        debug!("radio acknowledged notify");
        Ok(())
    }

    /// Tell the radio the session is over so it redraws its screen.
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        self.link.write_all(&frame::CLOSE_COMMAND).await?;
        self.link.flush().await?;
        Ok(())
    }

    /// Read one 1 KiB block at a KiB offset into SPI flash.
    ///
    /// A corrupted response is retried; a 0xFF lead byte is the bootloader
    /// answering instead of the firmware, which no retry will fix.
    pub async fn read_block(&mut self, kb_offset: u16) -> Result<[u8; BLOCK_SIZE], ProtocolError> {
        for attempt in 1..=READ_RETRIES {
            self.link
                .write_all(&frame::read_block_command(kb_offset))
                .await?;
            self.link.flush().await?;

            let mut packet = [0u8; BLOCK_PACKET_SIZE];
            self.link.read_exact(&mut packet).await?;

            if packet[0] == 0xFF {
                return Err(ProtocolError::Bootloader);
            }
            if frame::verify(&packet) {
                let mut data = [0u8; BLOCK_SIZE];
                data.copy_from_slice(&packet[3..3 + BLOCK_SIZE]);
                return Ok(data);
            }
            warn!(
                kb_offset,
                attempt, "block read failed checksum, retrying"
            );
        }
        Err(ProtocolError::ReadIntegrity {
            offset: kb_offset as usize * BLOCK_SIZE,
        })
    }

    /// Read `size` bytes starting at any SPI address. The wire only moves
    /// whole blocks, so the covering blocks are fetched and sliced.
    pub async fn read_span(
        &mut self,
        address: u32,
        size: usize,
        label: &str,
    ) -> Result<Vec<u8>, ProtocolError> {
        let kb_offset = (address as usize) / BLOCK_SIZE;
        let skip = (address as usize) % BLOCK_SIZE;
        let blocks = (skip + size).div_ceil(BLOCK_SIZE);

        let mut data = Vec::with_capacity(blocks * BLOCK_SIZE);
        for i in 0..blocks {
            self.check_cancelled(i)?;
            self.status(i, blocks, label);
            let block = self.read_block((kb_offset + i) as u16).await?;
            data.extend_from_slice(&block);
        }
        self.status(blocks, blocks, label);

        data.drain(..skip);
        data.truncate(size);
        Ok(data)
    }

    /// Dump the entire 4 MiB SPI flash.
    pub async fn read_backup(&mut self) -> Result<Vec<u8>, ProtocolError> {
        self.read_span(0, FULL_BACKUP_BLOCKS * BLOCK_SIZE, "Reading SPI flash")
            .await
    }

    /// Write one block into a region, retrying once after a NAK. `data` is
    /// at most a block; short data is 0xFF-padded on the wire.
    pub async fn write_block(
        &mut self,
        region: u8,
        block_num: u16,
        data: &[u8],
    ) -> Result<(), ProtocolError> {
        let packet = frame::write_block_packet(region, block_num, data);

        let mut last_response = 0u8;
        for attempt in 1..=WRITE_ATTEMPTS {
            self.link.write_all(&packet).await?;
            self.link.flush().await?;

            let mut response = [0u8; 1];
            self.link.read_exact(&mut response).await?;
            last_response = response[0];
            if last_response == ACK {
                return Ok(());
            }
            warn!(
                region,
                block_num,
                attempt,
                response = last_response,
                "write block not acknowledged"
            );
        }
        Err(ProtocolError::Nak(last_response))
    }

    /// Write a payload into a region as sequential 1 KiB blocks. A short
    /// trailing block is 0xFF-padded on the wire.
    pub async fn write_region_blocks(
        &mut self,
        region: u8,
        data: &[u8],
        label: &str,
    ) -> Result<(), ProtocolError> {
        let blocks = data.len().div_ceil(BLOCK_SIZE);

        for block_num in 0..blocks {
            self.check_cancelled(block_num)?;
            self.status(block_num, blocks, label);

            let start = block_num * BLOCK_SIZE;
            let end = (start + BLOCK_SIZE).min(data.len());
            self.write_block(region, block_num as u16, &data[start..end])
                .await?;
        }

        self.status(blocks, blocks, label);
        Ok(())
    }

    /// Upload the global address book. The payload is a 4-byte big-endian
    /// total length (including itself) followed by the GBK CSV body.
    pub async fn write_address_book(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        let body_len = data.len().min(ADDRESS_BOOK_MAX);
        let total_len = body_len + 4;

        let mut payload = Vec::with_capacity(total_len);
        payload.extend_from_slice(&(total_len as u32).to_be_bytes());
        payload.extend_from_slice(&data[..body_len]);

        let blocks = total_len.div_ceil(BLOCK_SIZE);
        for block_num in 0..blocks {
            self.check_cancelled(block_num)?;
            self.status(block_num, blocks, "Uploading address book");

            let start = block_num * BLOCK_SIZE;
            let end = (start + BLOCK_SIZE).min(payload.len());
            let packet = frame::address_book_packet(block_num as u16, &payload[start..end]);

            self.link.write_all(&packet).await?;
            self.link.flush().await?;

            let mut response = [0u8; 1];
            self.link.read_exact(&mut response).await?;
            match response[0] {
                ACK => {}
                frame::RESP_CAPACITY_MISMATCH => return Err(ProtocolError::CapacityMismatch),
                frame::RESP_CAPACITY_LIMIT => return Err(ProtocolError::CapacityExceeded),
                other => return Err(ProtocolError::Nak(other)),
            }
        }

        self.status(blocks, blocks, "Uploading address book");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::MockSerialPort;

    fn block_response(fill: u8) -> Vec<u8> {
        let mut packet = vec![0u8; BLOCK_PACKET_SIZE];
        packet[0] = 0x52;
        for byte in packet[3..3 + BLOCK_SIZE].iter_mut() {
            *byte = fill;
        }
        let ck = frame::checksum(&packet);
        packet[BLOCK_PACKET_SIZE - 1] = ck;
        packet
    }

    #[tokio::test]
    async fn test_notify_handshake() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[ACK]);
        let mut uart = Rt4dUart::new(port.clone());
        uart.notify().await.unwrap();
        assert!(port.was_written(&[0x34, 0x00, 0x00, 0x10, 0x44]));
    }

    #[tokio::test]
    async fn test_notify_nak() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[0x15]);
        let mut uart = Rt4dUart::new(port);
        assert!(matches!(uart.notify().await, Err(ProtocolError::Nak(0x15))));
    }

    #[tokio::test]
    async fn test_read_block() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&block_response(0xAB));
        let mut uart = Rt4dUart::new(port.clone());
        let data = uart.read_block(5).await.unwrap();
        assert!(data.iter().all(|&b| b == 0xAB));
        // command carried the KB offset and its checksum
        assert!(port.was_written(&frame::read_block_command(5)));
    }

    #[tokio::test]
    async fn test_read_block_retries_after_corruption() {
        let mut port = MockSerialPort::new();
        let mut bad = block_response(0x11);
        bad[100] ^= 0xFF;
        port.push_read_data(&bad);
        port.push_read_data(&block_response(0x11));

        let mut uart = Rt4dUart::new(port.clone());
        let data = uart.read_block(0).await.unwrap();
        assert!(data.iter().all(|&b| b == 0x11));
        // the read command went out twice
        let cmd = frame::read_block_command(0);
        let written = port.get_written_data();
        assert_eq!(written.len(), cmd.len() * 2);
    }

    #[tokio::test]
    async fn test_read_block_gives_up_after_retries() {
        let mut port = MockSerialPort::new();
        for _ in 0..READ_RETRIES {
            let mut bad = block_response(0x22);
            bad[50] ^= 0x01;
            port.push_read_data(&bad);
        }
        let mut uart = Rt4dUart::new(port);
        assert!(matches!(
            uart.read_block(7).await,
            Err(ProtocolError::ReadIntegrity { offset: 7168 })
        ));
    }

    #[tokio::test]
    async fn test_bootloader_detected() {
        let mut port = MockSerialPort::new();
        let mut packet = vec![0xFFu8; BLOCK_PACKET_SIZE];
        packet[BLOCK_PACKET_SIZE - 1] = frame::checksum(&packet);
        port.push_read_data(&packet);
        let mut uart = Rt4dUart::new(port);
        assert!(matches!(
            uart.read_block(0).await,
            Err(ProtocolError::Bootloader)
        ));
    }

    #[tokio::test]
    async fn test_write_region_blocks_partial_tail() {
        let mut port = MockSerialPort::new();
        // 8704 bytes is 8 full blocks plus a 512-byte tail
        let payload = vec![0x33u8; 8704];
        for _ in 0..9 {
            port.push_read_data(&[ACK]);
        }
        let mut uart = Rt4dUart::new(port.clone());
        uart.write_region_blocks(0x94, &payload, "grouplists")
            .await
            .unwrap();

        let written = port.get_written_data();
        assert_eq!(written.len(), 9 * BLOCK_PACKET_SIZE);
        // tail block is padded with 0xFF past the payload
        let tail = &written[8 * BLOCK_PACKET_SIZE..];
        assert_eq!(tail[0], 0x94);
        assert_eq!(tail[3 + 511], 0x33);
        assert_eq!(tail[3 + 512], 0xFF);
    }

    #[tokio::test]
    async fn test_write_retries_once_then_fails() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[0x15, 0x15]);
        let mut uart = Rt4dUart::new(port.clone());
        let result = uart
            .write_region_blocks(0x91, &[0u8; 1024], "channels")
            .await;
        assert!(matches!(result, Err(ProtocolError::Nak(0x15))));
        assert_eq!(port.get_written_data().len(), 2 * BLOCK_PACKET_SIZE);
    }

    #[tokio::test]
    async fn test_address_book_upload() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[ACK]);
        let mut uart = Rt4dUart::new(port.clone());
        let csv = b"1,Alice,,,,\n".to_vec();
        uart.write_address_book(&csv).await.unwrap();

        let written = port.get_written_data();
        assert_eq!(written.len(), BLOCK_PACKET_SIZE);
        assert_eq!(written[0], 0xA4);
        // big-endian total length includes the 4-byte header
        let total = (csv.len() + 4) as u32;
        assert_eq!(&written[3..7], &total.to_be_bytes());
        assert_eq!(&written[7..7 + csv.len()], csv.as_slice());
    }

    #[tokio::test]
    async fn test_address_book_capacity_errors() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[frame::RESP_CAPACITY_LIMIT]);
        let mut uart = Rt4dUart::new(port);
        assert!(matches!(
            uart.write_address_book(&[0u8; 10]).await,
            Err(ProtocolError::CapacityExceeded)
        ));
    }

    #[tokio::test]
    async fn test_cancellation_at_block_boundary() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[ACK]);
        let token = Arc::new(AtomicBool::new(true));
        let mut uart = Rt4dUart::new(port.clone());
        uart.set_cancel_token(token);
        let result = uart
            .write_region_blocks(0x91, &[0u8; 2048], "channels")
            .await;
        assert!(matches!(
            result,
            Err(ProtocolError::Cancelled { completed: 0 })
        ));
        assert!(port.get_written_data().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_reports_completed_blocks() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[ACK, ACK]);
        let token = Arc::new(AtomicBool::new(false));
        let flag = token.clone();
        let mut uart = Rt4dUart::new(port.clone());
        uart.set_cancel_token(token);
        // request cancellation while the second block is in flight
        uart.set_status_fn(Box::new(move |current, _, _| {
            if current == 1 {
                flag.store(true, Ordering::Relaxed);
            }
        }));

        let result = uart
            .write_region_blocks(0x91, &[0u8; 3072], "channels")
            .await;
        assert!(matches!(
            result,
            Err(ProtocolError::Cancelled { completed: 2 })
        ));
        // blocks 0 and 1 went out whole, block 2 never started
        assert_eq!(port.get_written_data().len(), 2 * BLOCK_PACKET_SIZE);
    }

    #[tokio::test]
    async fn test_progress_reported_per_block() {
        let mut port = MockSerialPort::new();
        for _ in 0..2 {
            port.push_read_data(&block_response(0x00));
        }
        let mut uart = Rt4dUart::new(port);
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        uart.set_status_fn(Box::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        }));
        uart.read_span(0, 2048, "test").await.unwrap();
        assert_eq!(&*seen.lock().unwrap(), &[(0, 2), (1, 2), (2, 2)]);
    }
}
