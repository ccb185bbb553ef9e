// Probed radio session
//
// A `Session` wraps a UART engine that has completed the notify handshake
// and firmware-layout detection. The layout matters for one thing: which
// SPI bank holds the active settings region. Firmware with the extended
// layout marks its active bank with the ASCII magic "DTCN" in the last 4
// bytes of the settings block; bank 0 is checked first and wins ties.
// Radios without the marker must still carry the CFG signature at the
// legacy bank-0 address, otherwise the layout is not one we know.

use tracing::{debug, info};

use crate::addressbook::AddressBook;
use crate::codec;
use crate::memmap::image::CodeplugImage;
use crate::memmap::region::{RegionId, REGIONS};
use crate::models::{Message, MessageKind};
use crate::serial::{list_ports, SerialConfig, SerialLink, SerialPort};

use super::uart::{Rt4dUart, StatusCallback};
use super::ProtocolError;

const LAYOUT_MAGIC: &[u8; 4] = b"DTCN";

const SETTINGS_BANK0_ADDR: u32 = 0x2000;
const SETTINGS_BANK1_ADDR: u32 = 0x3000;
const BANK0_MAGIC_OFFSET: u32 = 0x2FFC;
const BANK1_MAGIC_OFFSET: u32 = 0x3FFC;

/// Firmware settings layout, detected once at probe time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareVariant {
    /// Extended layout, active settings in bank 0 (0x2000).
    ExtendedBank0,
    /// Extended layout, active settings in bank 1 (0x3000).
    ExtendedBank1,
    /// No layout marker; settings at the legacy bank-0 address.
    Legacy,
}

impl FirmwareVariant {
    pub fn settings_address(self) -> u32 {
        match self {
            FirmwareVariant::ExtendedBank1 => SETTINGS_BANK1_ADDR,
            _ => SETTINGS_BANK0_ADDR,
        }
    }
}

pub struct Session<L: SerialLink> {
    uart: Rt4dUart<L>,
    variant: FirmwareVariant,
}

impl<L: SerialLink> Session<L> {
    /// Handshake with the radio and detect its firmware layout.
    pub async fn probe(link: L) -> Result<Self, ProtocolError> {
        let mut uart = Rt4dUart::new(link);
        uart.notify().await?;

        let bank0 = uart
            .read_span(BANK0_MAGIC_OFFSET, 4, "Detecting firmware layout")
            .await?;
        let variant = if bank0 == LAYOUT_MAGIC {
            FirmwareVariant::ExtendedBank0
        } else {
            let bank1 = uart
                .read_span(BANK1_MAGIC_OFFSET, 4, "Detecting firmware layout")
                .await?;
            if bank1 == LAYOUT_MAGIC {
                FirmwareVariant::ExtendedBank1
            } else {
                // no bank marker; legacy firmware still signs its CFG block
                let head = uart
                    .read_span(
                        SETTINGS_BANK0_ADDR,
                        codec::settings::MAGIC_OFFSET + 2,
                        "Detecting firmware layout",
                    )
                    .await?;
                if head[codec::settings::MAGIC_OFFSET..] == codec::settings::MAGIC {
                    FirmwareVariant::Legacy
                } else {
                    return Err(ProtocolError::UnsupportedFirmware);
                }
            }
        };
        info!(?variant, "radio session established");

        Ok(Self { uart, variant })
    }

    pub fn firmware_variant(&self) -> FirmwareVariant {
        self.variant
    }

    pub fn set_status_fn(&mut self, status_fn: StatusCallback) {
        self.uart.set_status_fn(status_fn);
    }

    pub fn set_cancel_token(&mut self, token: std::sync::Arc<std::sync::atomic::AtomicBool>) {
        self.uart.set_cancel_token(token);
    }

    /// SPI address a region reads from on this radio.
    fn region_address(&self, region: RegionId) -> u32 {
        if region == RegionId::Settings {
            self.variant.settings_address()
        } else {
            region.info().spi_addr
        }
    }

    /// Read one region's payload from the radio.
    pub async fn read_region(&mut self, region: RegionId) -> Result<Vec<u8>, ProtocolError> {
        let info = region.info();
        self.uart
            .read_span(self.region_address(region), info.payload_size(), info.name)
            .await
    }

    /// Read `size` bytes starting `offset` bytes into a region.
    pub async fn read_region_span(
        &mut self,
        region: RegionId,
        offset: usize,
        size: usize,
    ) -> Result<Vec<u8>, ProtocolError> {
        let info = region.info();
        self.uart
            .read_span(self.region_address(region) + offset as u32, size, info.name)
            .await
    }

    /// Write one region's payload to the radio.
    pub async fn write_region(
        &mut self,
        region: RegionId,
        data: &[u8],
    ) -> Result<(), ProtocolError> {
        let info = region.info();
        self.uart
            .write_region_blocks(info.spi_region, data, info.name)
            .await
    }

    /// Rewrite a single 1 KiB block within a region.
    pub async fn write_region_block(
        &mut self,
        region: RegionId,
        block: usize,
        data: &[u8],
    ) -> Result<(), ProtocolError> {
        self.uart
            .write_block(region.info().spi_region, block as u16, data)
            .await
    }

    /// Read every file-backed region and assemble a codeplug image.
    pub async fn read_codeplug(&mut self) -> Result<CodeplugImage, ProtocolError> {
        let mut image = CodeplugImage::factory_fresh();
        for region in REGIONS.iter().filter(|r| r.image_offset.is_some()) {
            debug!(region = region.name, "reading region");
            let data = self.read_region(region.id).await?;
            image.region_bytes_mut(region.id)?.copy_from_slice(&data);
        }
        image.clear_dirty();
        Ok(image)
    }

    /// Read the preset SMS bank.
    pub async fn read_messages(&mut self) -> Result<Vec<Message>, ProtocolError> {
        let data = self.read_region(RegionId::Messages).await?;
        Ok(codec::message::decode_region(&data, MessageKind::Preset)?)
    }

    /// Replace the preset SMS bank.
    pub async fn write_messages(&mut self, messages: &[Message]) -> Result<(), ProtocolError> {
        let mut data = vec![0xFF; RegionId::Messages.info().payload_size()];
        codec::message::encode_region(messages, &mut data)?;
        self.write_region(RegionId::Messages, &data).await
    }

    /// Upload the global contact address book.
    pub async fn upload_address_book(
        &mut self,
        book: &AddressBook,
    ) -> Result<(), ProtocolError> {
        let payload = book.radio_payload()?;
        self.uart.write_address_book(&payload).await
    }

    /// Dump the whole 4 MiB SPI flash.
    pub async fn backup(&mut self) -> Result<Vec<u8>, ProtocolError> {
        self.uart.read_backup().await
    }

    /// End the session so the radio leaves programming mode.
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        self.uart.close().await
    }
}

/// Probe every available serial port and return a session on the first
/// radio that answers.
pub async fn probe_any(config: &SerialConfig) -> Result<Session<SerialPort>, ProtocolError> {
    for name in list_ports()? {
        let port = match SerialPort::open(&name, config.clone()) {
            Ok(port) => port,
            Err(e) => {
                debug!(port = %name, error = %e, "could not open port");
                continue;
            }
        };
        match Session::probe(port).await {
            Ok(session) => {
                info!(port = %name, "radio found");
                return Ok(session);
            }
            Err(e) => {
                debug!(port = %name, error = %e, "no radio on port");
            }
        }
    }
    Err(ProtocolError::NoDeviceFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::{self, ACK, BLOCK_PACKET_SIZE, BLOCK_SIZE};
    use crate::serial::MockSerialPort;

    fn block_response(data: &[u8; BLOCK_SIZE]) -> Vec<u8> {
        let mut packet = vec![0u8; BLOCK_PACKET_SIZE];
        packet[0] = 0x52;
        packet[3..3 + BLOCK_SIZE].copy_from_slice(data);
        packet[BLOCK_PACKET_SIZE - 1] = frame::checksum(&packet);
        packet
    }

    fn magic_block(magic: &[u8; 4]) -> Vec<u8> {
        let mut data = [0xFFu8; BLOCK_SIZE];
        data[BLOCK_SIZE - 4..].copy_from_slice(magic);
        block_response(&data)
    }

    #[tokio::test]
    async fn test_probe_detects_bank0() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[ACK]);
        port.push_read_data(&magic_block(b"DTCN"));

        let session = Session::probe(port).await.unwrap();
        assert_eq!(session.firmware_variant(), FirmwareVariant::ExtendedBank0);
        assert_eq!(session.region_address(RegionId::Settings), 0x2000);
    }

    #[tokio::test]
    async fn test_probe_detects_bank1() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[ACK]);
        port.push_read_data(&magic_block(b"\xFF\xFF\xFF\xFF"));
        port.push_read_data(&magic_block(b"DTCN"));

        let session = Session::probe(port).await.unwrap();
        assert_eq!(session.firmware_variant(), FirmwareVariant::ExtendedBank1);
        assert_eq!(session.region_address(RegionId::Settings), 0x3000);
    }

    fn signed_settings_block() -> Vec<u8> {
        let mut data = [0xFFu8; BLOCK_SIZE];
        data[codec::settings::MAGIC_OFFSET..codec::settings::MAGIC_OFFSET + 2]
            .copy_from_slice(&codec::settings::MAGIC);
        block_response(&data)
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_legacy() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[ACK]);
        port.push_read_data(&magic_block(b"\x00\x00\x00\x00"));
        port.push_read_data(&magic_block(b"\x00\x00\x00\x00"));
        port.push_read_data(&signed_settings_block());

        let session = Session::probe(port).await.unwrap();
        assert_eq!(session.firmware_variant(), FirmwareVariant::Legacy);
        assert_eq!(session.region_address(RegionId::Settings), 0x2000);
    }

    #[tokio::test]
    async fn test_probe_rejects_unknown_layout() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[ACK]);
        port.push_read_data(&magic_block(b"\xFF\xFF\xFF\xFF"));
        port.push_read_data(&magic_block(b"\xFF\xFF\xFF\xFF"));
        // no bank marker and no CFG signature either
        port.push_read_data(&block_response(&[0u8; BLOCK_SIZE]));

        let result = Session::probe(port.clone()).await;
        assert!(matches!(result, Err(ProtocolError::UnsupportedFirmware)));
        // only the notify and the three probe reads went out, no writes
        assert_eq!(port.get_written_data().len(), 5 + 3 * 4);
    }

    #[tokio::test]
    async fn test_probe_requires_ack() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[0x00]);
        assert!(matches!(
            Session::probe(port).await,
            Err(ProtocolError::Nak(0x00))
        ));
    }

    #[tokio::test]
    async fn test_read_messages_decodes_preset_bank() {
        let mut port = MockSerialPort::new();
        port.push_read_data(&[ACK]);
        port.push_read_data(&magic_block(b"DTCN"));

        // message bank: one preset entry in slot 0, rest empty
        let mut bank = vec![0xFFu8; RegionId::Messages.info().payload_size()];
        let msg = Message {
            index: 0,
            kind: MessageKind::Preset,
            call_type: crate::models::CallType::Private,
            contact_id: 0,
            timestamp: None,
            text: "Calling".into(),
        };
        codec::message::encode_region(&[msg.clone()], &mut bank).unwrap();
        for chunk in bank.chunks(BLOCK_SIZE) {
            let mut block = [0xFFu8; BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            port.push_read_data(&block_response(&block));
        }

        let mut session = Session::probe(port).await.unwrap();
        let messages = session.read_messages().await.unwrap();
        assert_eq!(messages, vec![msg]);
    }
}
