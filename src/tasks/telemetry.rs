// MyoBand - Telemetry Task
//
// Periodically drains unsent records from the sample ring into the outbound
// packet buffer and hands each packet to the radio link. Records the
// sampling task overwrote before they were drained are counted and dropped.

use std::thread;
use std::time::Duration;

use crate::config::*;
use crate::frame::{FrameBatcher, FrameLink, TxBuffer};
use crate::ring::SharedRing;

/// Link sink used until a radio stack is attached: logs packet sizes.
pub struct LogLink;

impl FrameLink for LogLink {
    fn transmit(&mut self, packet: &[u8]) -> anyhow::Result<()> {
        log::debug!("TX {} bytes: {:02X?}", packet.len(), packet);
        Ok(())
    }
}

pub fn telemetry_task<L: FrameLink>(ring: &'static SharedRing<SAMPLE_RING_CAPACITY>, mut link: L) {
    log::info!("Telemetry task started");

    let interval = Duration::from_millis(TELEMETRY_INTERVAL_MS);
    let mut batcher = FrameBatcher::new();
    let mut tx = TxBuffer::new();
    let mut total_dropped: u64 = 0;

    loop {
        let batch = ring.with(|r| batcher.fill(r, &mut tx));

        if batch.dropped > 0 {
            total_dropped += u64::from(batch.dropped);
            log::warn!(
                "Telemetry behind: {} samples overwritten ({} total)",
                batch.dropped,
                total_dropped
            );
        }

        if batch.frames > 0 {
            if let Err(e) = link.transmit(tx.packet(batch.frames)) {
                log::warn!("Link transmit failed: {}", e);
            }
        }

        thread::sleep(interval);
    }
}
