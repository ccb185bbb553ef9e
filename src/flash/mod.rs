// Region flash orchestrator
//
// Flashes selected regions of a codeplug image to the radio and verifies
// each one by reading it back. Regions always go out in region-map order,
// duplicates are flashed once, and a failure in one region is recorded and
// does not stop the rest. Cancellation is the exception: it aborts the
// whole run.

use tracing::{info, warn};

use crate::memmap::image::CodeplugImage;
use crate::memmap::region::{RegionId, REGIONS};
use crate::protocol::{ProtocolError, Session};
use crate::serial::SerialLink;

const BLOCK_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionStatus {
    /// Written and read back identical.
    Success,
    /// Written, but the read-back differed from the image.
    VerifyFailed,
    /// The transfer itself failed.
    TransportError,
}

#[derive(Debug)]
pub struct RegionResult {
    pub region: RegionId,
    pub status: RegionStatus,
    pub detail: String,
}

impl RegionResult {
    pub fn succeeded(&self) -> bool {
        self.status == RegionStatus::Success
    }
}

/// Flash the requested regions from `image` and verify each by read-back.
///
/// Returns one result per distinct requested region, in region-map order.
pub async fn flash_regions<L: SerialLink>(
    session: &mut Session<L>,
    image: &CodeplugImage,
    regions: &[RegionId],
) -> Result<Vec<RegionResult>, ProtocolError> {
    let mut results = Vec::new();

    for info in REGIONS.iter().filter(|r| regions.contains(&r.id)) {
        match flash_one(session, image, info.id).await {
            Ok(result) => {
                if result.succeeded() {
                    info!(region = info.name, "region flashed and verified");
                } else {
                    warn!(region = info.name, detail = %result.detail, "region failed");
                }
                results.push(result);
            }
            // cancellation aborts the run, anything else is per-region
            Err(e @ ProtocolError::Cancelled { .. }) => return Err(e),
            Err(e) => {
                warn!(region = info.name, error = %e, "region transfer failed");
                results.push(RegionResult {
                    region: info.id,
                    status: RegionStatus::TransportError,
                    detail: e.to_string(),
                });
            }
        }
    }

    Ok(results)
}

async fn flash_one<L: SerialLink>(
    session: &mut Session<L>,
    image: &CodeplugImage,
    region: RegionId,
) -> Result<RegionResult, ProtocolError> {
    let payload = image.region_bytes(region)?;

    // The wire writes whole 1 KiB blocks. A partial trailing block would
    // clobber whatever the device stores after the payload, so merge the
    // device's own tail bytes in first.
    let tail = payload.len() % BLOCK_SIZE;
    let mut buffer = payload.to_vec();
    if tail != 0 {
        let block_start = payload.len() - tail;
        let device_block = session
            .read_region_span(region, block_start, BLOCK_SIZE)
            .await?;
        buffer.extend_from_slice(&device_block[tail..]);
    }

    session.write_region(region, &buffer).await?;

    let mut readback = session.read_region(region).await?;
    if let Some(offset) = first_mismatch(&readback, payload) {
        // one more chance for the block that came back wrong
        let block = offset / BLOCK_SIZE;
        let start = block * BLOCK_SIZE;
        let end = (start + BLOCK_SIZE).min(buffer.len());
        warn!(?region, block, "verification mismatch, rewriting block");
        session
            .write_region_block(region, block, &buffer[start..end])
            .await?;

        let span_end = (start + BLOCK_SIZE).min(payload.len());
        let span = session
            .read_region_span(region, start, span_end - start)
            .await?;
        readback[start..span_end].copy_from_slice(&span);
    }

    if let Some(offset) = first_mismatch(&readback, payload) {
        return Ok(RegionResult {
            region,
            status: RegionStatus::VerifyFailed,
            detail: format!("read-back differs at byte {}", offset),
        });
    }

    Ok(RegionResult {
        region,
        status: RegionStatus::Success,
        detail: String::new(),
    })
}

fn first_mismatch(readback: &[u8], expected: &[u8]) -> Option<usize> {
    if readback.len() != expected.len() {
        return Some(readback.len().min(expected.len()));
    }
    readback.iter().zip(expected).position(|(a, b)| a != b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, ContactKind, GroupList};
    use crate::protocol::frame::{self, ACK, BLOCK_PACKET_SIZE};
    use crate::serial::MockSerialPort;

    fn block_response(data: &[u8]) -> Vec<u8> {
        let mut packet = vec![0u8; BLOCK_PACKET_SIZE];
        packet[0] = 0x52;
        let take = data.len().min(BLOCK_SIZE);
        packet[3..3 + take].copy_from_slice(&data[..take]);
        for byte in packet[3 + take..3 + BLOCK_SIZE].iter_mut() {
            *byte = 0xFF;
        }
        packet[BLOCK_PACKET_SIZE - 1] = frame::checksum(&packet);
        packet
    }

    fn push_probe(port: &mut MockSerialPort) {
        port.push_read_data(&[ACK]);
        let mut magic = [0xFFu8; BLOCK_SIZE];
        magic[BLOCK_SIZE - 4..].copy_from_slice(b"DTCN");
        port.push_read_data(&block_response(&magic));
    }

    fn push_region_blocks(port: &mut MockSerialPort, payload: &[u8]) {
        for chunk in payload.chunks(BLOCK_SIZE) {
            port.push_read_data(&block_response(chunk));
        }
    }

    #[tokio::test]
    async fn test_partial_tail_block_is_read_modify_write() {
        let mut image = CodeplugImage::factory_fresh();
        let mut list = GroupList::new(0, "Net");
        list.push_contact(1);
        image.set_group_lists(&[list]).unwrap();
        let payload = image.region_bytes(RegionId::GroupLists).unwrap().to_vec();
        assert_eq!(payload.len(), 8704);

        let mut port = MockSerialPort::new();
        push_probe(&mut port);
        // device tail block merged into the partial write
        let device_tail = [0xABu8; BLOCK_SIZE];
        port.push_read_data(&block_response(&device_tail));
        // 9 write ACKs
        port.push_read_data(&[ACK; 9]);
        // verify read-back
        push_region_blocks(&mut port, &payload);

        let mut session = Session::probe(port.clone()).await.unwrap();
        let results = flash_regions(&mut session, &image, &[RegionId::GroupLists])
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].succeeded());

        // the last write packet carries payload tail then device bytes;
        // the 9 verify read commands (4 bytes each) follow it in the capture
        let written = port.get_written_data();
        let last_packet_end = written.len() - 9 * 4;
        let last = &written[last_packet_end - BLOCK_PACKET_SIZE..last_packet_end];
        assert_eq!(last[0], 0x94);
        assert_eq!(last[3 + 511], payload[8703]);
        assert_eq!(last[3 + 512], 0xAB);
    }

    #[tokio::test]
    async fn test_requested_order_and_dedup() {
        let image = CodeplugImage::factory_fresh();
        let contacts_payload = image.region_bytes(RegionId::Contacts).unwrap().to_vec();
        let zones_payload = image.region_bytes(RegionId::Zones).unwrap().to_vec();

        let mut port = MockSerialPort::new();
        push_probe(&mut port);
        // contacts: 64 writes + verify
        port.push_read_data(&[ACK; 64]);
        push_region_blocks(&mut port, &contacts_payload);
        // zones: 128 writes + verify
        port.push_read_data(&[ACK; 128]);
        push_region_blocks(&mut port, &zones_payload);

        let mut session = Session::probe(port).await.unwrap();
        // requested out of order, with a duplicate
        let results = flash_regions(
            &mut session,
            &image,
            &[RegionId::Zones, RegionId::Contacts, RegionId::Contacts],
        )
        .await
        .unwrap();

        let order: Vec<RegionId> = results.iter().map(|r| r.region).collect();
        assert_eq!(order, vec![RegionId::Contacts, RegionId::Zones]);
        assert!(results.iter().all(|r| r.succeeded()));
    }

    #[tokio::test]
    async fn test_region_failure_does_not_stop_the_rest() {
        let mut image = CodeplugImage::factory_fresh();
        image
            .set_contacts(&[Contact::new(0, "A", ContactKind::Private, 1)])
            .unwrap();
        let fm_payload = image.region_bytes(RegionId::FmSettings).unwrap().to_vec();

        let mut port = MockSerialPort::new();
        push_probe(&mut port);
        // contacts first block NAKed twice: region fails
        port.push_read_data(&[0x15, 0x15]);
        // fm settings: 1 write + verify
        port.push_read_data(&[ACK]);
        push_region_blocks(&mut port, &fm_payload);

        let mut session = Session::probe(port).await.unwrap();
        let results = flash_regions(
            &mut session,
            &image,
            &[RegionId::Contacts, RegionId::FmSettings],
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].region, RegionId::Contacts);
        assert_eq!(results[0].status, RegionStatus::TransportError);
        assert_eq!(results[1].region, RegionId::FmSettings);
        assert!(results[1].succeeded());
    }

    #[tokio::test]
    async fn test_verify_mismatch_rewrites_block_once() {
        let image = CodeplugImage::factory_fresh();
        let fm_payload = image.region_bytes(RegionId::FmSettings).unwrap().to_vec();
        let mut corrupted = fm_payload.clone();
        corrupted[10] ^= 0xFF;

        let mut port = MockSerialPort::new();
        push_probe(&mut port);
        port.push_read_data(&[ACK]);
        // first verify pass comes back wrong
        push_region_blocks(&mut port, &corrupted);
        // rewrite of the failing block is acknowledged, re-read is clean
        port.push_read_data(&[ACK]);
        push_region_blocks(&mut port, &fm_payload);

        let mut session = Session::probe(port).await.unwrap();
        let results = flash_regions(&mut session, &image, &[RegionId::FmSettings])
            .await
            .unwrap();
        assert!(results[0].succeeded());
    }

    #[tokio::test]
    async fn test_verify_mismatch_reported_after_retry() {
        let image = CodeplugImage::factory_fresh();
        let mut fm_payload = image.region_bytes(RegionId::FmSettings).unwrap().to_vec();
        fm_payload[10] ^= 0xFF;

        let mut port = MockSerialPort::new();
        push_probe(&mut port);
        port.push_read_data(&[ACK]);
        push_region_blocks(&mut port, &fm_payload);
        // block rewrite acknowledged but the re-read still differs
        port.push_read_data(&[ACK]);
        push_region_blocks(&mut port, &fm_payload);

        let mut session = Session::probe(port).await.unwrap();
        let results = flash_regions(&mut session, &image, &[RegionId::FmSettings])
            .await
            .unwrap();
        assert_eq!(results[0].status, RegionStatus::VerifyFailed);
        assert!(results[0].detail.contains("byte 10"));
    }

    #[tokio::test]
    async fn test_device_only_region_is_a_transport_error() {
        let image = CodeplugImage::factory_fresh();
        let mut port = MockSerialPort::new();
        push_probe(&mut port);

        let mut session = Session::probe(port).await.unwrap();
        let results = flash_regions(&mut session, &image, &[RegionId::Messages])
            .await
            .unwrap();
        assert_eq!(results[0].status, RegionStatus::TransportError);
    }
}
