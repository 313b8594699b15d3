// MyoBand - Sample Ring Buffer
//
// Fixed-capacity circular store of sample records. The sampling task is the
// only writer; the telemetry task reads by sequence number. When the reader
// falls behind, the oldest records are overwritten without notice.

use std::sync::{Mutex, PoisonError};

use crate::events::SampleRecord;

/// Circular buffer of `N` records addressed by a running sequence number.
///
/// Sequence numbers count appends since power-on and wrap at `u32::MAX`; a
/// record with sequence `seq` lives in slot `seq % N`. `N` must be a power of
/// two so that the slot mapping stays continuous across that wrap.
#[derive(Debug, Clone)]
pub struct SampleRing<const N: usize> {
    slots: [SampleRecord; N],
    written: u32,
    filled: bool,
}

impl<const N: usize> SampleRing<N> {
    const CAPACITY_OK: () = assert!(
        N.is_power_of_two() && N <= (1 << 31),
        "ring capacity must be a power of two"
    );

    pub const fn new() -> Self {
        let () = Self::CAPACITY_OK;
        Self {
            slots: [SampleRecord::EMPTY; N],
            written: 0,
            filled: false,
        }
    }

    /// Store `record` at the write cursor and advance it, overwriting the
    /// oldest entry once the ring is full.
    pub fn append(&mut self, record: SampleRecord) {
        self.slots[Self::slot(self.written)] = record;
        self.written = self.written.wrapping_add(1);
        if Self::slot(self.written) == 0 {
            self.filled = true;
        }
    }

    /// Record with sequence number `index`.
    ///
    /// Only the last `N` appends are retained. Reading an older index returns
    /// whatever has since been written to that slot; debug builds assert.
    pub fn read(&self, index: u32) -> SampleRecord {
        debug_assert!(
            self.is_retained(index),
            "sample {index} not retained (written = {})",
            self.written
        );
        self.slots[Self::slot(index)]
    }

    /// Sequence number the next append will get.
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Sequence number of the oldest record still in the ring.
    pub fn oldest(&self) -> u32 {
        let retained = self.len() as u32;
        self.written.wrapping_sub(retained)
    }

    /// Number of retained records (saturates at `N`).
    pub fn len(&self) -> usize {
        if self.filled {
            N
        } else {
            Self::slot(self.written)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_retained(&self, index: u32) -> bool {
        let age = self.written.wrapping_sub(index);
        age >= 1 && age as usize <= self.len()
    }

    fn slot(seq: u32) -> usize {
        seq as usize & (N - 1)
    }
}

impl<const N: usize> Default for SampleRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ring shared between the sampling (producer) and telemetry (consumer)
/// threads.
///
/// The lock is held for one append or one batch drain, never across a sleep
/// or a radio call.
pub struct SharedRing<const N: usize> {
    inner: Mutex<SampleRing<N>>,
}

impl<const N: usize> SharedRing<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(SampleRing::new()),
        }
    }

    pub fn append(&self, record: SampleRecord) {
        self.with(|ring| ring.append(record));
    }

    /// Run `f` with the ring locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut SampleRing<N>) -> R) -> R {
        // A panicked writer leaves at most one half-updated slot; keep going.
        let mut ring = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut ring)
    }
}

impl<const N: usize> Default for SharedRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Gesture;

    fn record(ts: u16) -> SampleRecord {
        SampleRecord {
            timestamp: ts,
            gesture: Gesture::from(ts % 3 == 0),
            motor_current: (ts % 256) as u8,
            battery_voltage: 200,
        }
    }

    #[test]
    fn reads_back_in_order_before_wrap() {
        let mut ring = SampleRing::<8>::new();
        assert!(ring.is_empty());
        for ts in 0..5 {
            ring.append(record(ts));
        }
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.oldest(), 0);
        for seq in 0..5u32 {
            assert_eq!(ring.read(seq), record(seq as u16));
        }
    }

    #[test]
    fn exactly_capacity_appends_fill_without_overwrite() {
        let mut ring = SampleRing::<8>::new();
        for ts in 0..8 {
            ring.append(record(ts));
        }
        assert_eq!(ring.len(), 8);
        assert_eq!(ring.written(), 8);
        assert_eq!(ring.oldest(), 0);
        for seq in 0..8u32 {
            assert!(ring.is_retained(seq));
            assert_eq!(ring.read(seq), record(seq as u16));
        }

        // The ninth append is the first overwrite.
        ring.append(record(8));
        assert_eq!(ring.oldest(), 1);
        assert!(!ring.is_retained(0));
    }

    #[test]
    fn keeps_last_capacity_records_after_overwrite() {
        let mut ring = SampleRing::<8>::new();
        let extra = 13;
        for ts in 0..(8 + extra) {
            ring.append(record(ts));
        }
        assert_eq!(ring.len(), 8);
        assert_eq!(ring.written(), 21);
        assert_eq!(ring.oldest(), 13);
        for seq in ring.oldest()..ring.written() {
            assert_eq!(ring.read(seq), record(seq as u16));
        }
        assert!(!ring.is_retained(12));
        assert!(!ring.is_retained(21));
    }

    #[test]
    fn sequence_wrap_keeps_slot_mapping() {
        let mut ring = SampleRing::<4>::new();
        ring.written = u32::MAX - 1;
        ring.filled = true;
        ring.append(record(1)); // seq MAX-1
        ring.append(record(2)); // seq MAX
        ring.append(record(3)); // seq 0
        assert_eq!(ring.written(), 1);
        assert_eq!(ring.read(u32::MAX - 1), record(1));
        assert_eq!(ring.read(u32::MAX), record(2));
        assert_eq!(ring.read(0), record(3));
        assert!(ring.is_retained(u32::MAX - 1));
    }

    #[test]
    #[should_panic(expected = "not retained")]
    #[cfg(debug_assertions)]
    fn reading_overwritten_index_asserts_in_debug() {
        let mut ring = SampleRing::<4>::new();
        for ts in 0..6 {
            ring.append(record(ts));
        }
        let _ = ring.read(1);
    }

    #[test]
    fn shared_ring_appends_from_another_thread() {
        use std::sync::Arc;
        use std::thread;

        let shared = Arc::new(SharedRing::<64>::new());
        let producer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for ts in 0..100 {
                    shared.append(record(ts));
                }
            })
        };
        producer.join().unwrap();

        shared.with(|ring| {
            assert_eq!(ring.written(), 100);
            assert_eq!(ring.read(99), record(99));
            assert_eq!(ring.read(36), record(36));
        });
    }
}
