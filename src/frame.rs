// MyoBand - Telemetry Frame Packing
//
// Wire layout per sample (5 bytes, from the start of its slot):
//   0  timestamp >> 8
//   1  timestamp & 0xFF
//   2  gesture code
//   3  motor current (raw)
//   4  battery voltage (raw)
//
// Slot k of an outbound buffer starts at `header_size + k * FRAME_BYTES`. The
// header bytes belong to the link layer and are never touched here.

use crate::config::{FRAMES_PER_PACKET, FRAME_BYTES, TX_BUFFER_LEN, TX_HEADER_BYTES};
use crate::events::SampleRecord;
use crate::ring::SampleRing;

/// Serialize `record` into slot `slot_index` of `destination`.
///
/// Only the five bytes of that slot are written. The slot must lie inside
/// `destination`; debug builds assert, release builds panic on the slice
/// index.
pub fn write_frame(
    destination: &mut [u8],
    header_size: usize,
    slot_index: usize,
    record: &SampleRecord,
) {
    let offset = header_size + slot_index * FRAME_BYTES;
    debug_assert!(
        offset + FRAME_BYTES <= destination.len(),
        "frame slot {slot_index} overruns a {}-byte buffer",
        destination.len()
    );

    let [ts_hi, ts_lo] = record.timestamp.to_be_bytes();
    destination[offset..offset + FRAME_BYTES].copy_from_slice(&[
        ts_hi,
        ts_lo,
        record.gesture.code(),
        record.motor_current,
        record.battery_voltage,
    ]);
}

/// Copy ring entry `source_index` into slot `slot_index` of the outbound
/// buffer, after the link-layer header.
pub fn pack<const N: usize>(
    destination: &mut TxBuffer,
    slot_index: usize,
    ring: &SampleRing<N>,
    source_index: u32,
) {
    let record = ring.read(source_index);
    write_frame(&mut destination.bytes, TX_HEADER_BYTES, slot_index, &record);
}

// ---------------------------------------------------------------------------
// Outbound buffer
// ---------------------------------------------------------------------------

/// Fixed-size packet buffer: link-layer header followed by frame slots.
#[derive(Debug, Clone)]
pub struct TxBuffer {
    bytes: [u8; TX_BUFFER_LEN],
}

impl TxBuffer {
    pub const fn new() -> Self {
        Self {
            bytes: [0; TX_BUFFER_LEN],
        }
    }

    /// Header plus the first `frames` slots, ready for the radio.
    pub fn packet(&self, frames: usize) -> &[u8] {
        let frames = frames.min(FRAMES_PER_PACKET);
        &self.bytes[..TX_HEADER_BYTES + frames * FRAME_BYTES]
    }
}

impl Default for TxBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Batcher: drains the ring into packets
// ---------------------------------------------------------------------------

/// Result of one drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Batch {
    /// Slots filled, starting at slot 0.
    pub frames: usize,
    /// Records overwritten by the producer before they could be sent.
    pub dropped: u32,
}

/// Consumer-side read cursor over a [`SampleRing`].
#[derive(Debug, Clone, Default)]
pub struct FrameBatcher {
    next_seq: u32,
}

impl FrameBatcher {
    pub const fn new() -> Self {
        Self { next_seq: 0 }
    }

    /// Pack up to [`FRAMES_PER_PACKET`] unsent records, oldest first.
    ///
    /// If the producer lapped the cursor, skip ahead to the oldest record the
    /// ring still holds and report the gap in [`Batch::dropped`].
    pub fn fill<const N: usize>(&mut self, ring: &SampleRing<N>, buffer: &mut TxBuffer) -> Batch {
        let mut pending = ring.written().wrapping_sub(self.next_seq);
        let mut dropped = 0;
        if pending as usize > ring.len() {
            let oldest = ring.oldest();
            dropped = oldest.wrapping_sub(self.next_seq);
            self.next_seq = oldest;
            pending = ring.len() as u32;
        }

        let frames = (pending as usize).min(FRAMES_PER_PACKET);
        for slot in 0..frames {
            pack(buffer, slot, ring, self.next_seq);
            self.next_seq = self.next_seq.wrapping_add(1);
        }

        Batch { frames, dropped }
    }

    /// Sequence number of the next record to send.
    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }
}

// ---------------------------------------------------------------------------
// Link layer seam
// ---------------------------------------------------------------------------

/// Radio transport for finished packets.
pub trait FrameLink {
    fn transmit(&mut self, packet: &[u8]) -> anyhow::Result<()>;
}
