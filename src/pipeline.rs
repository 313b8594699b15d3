// MyoBand - Per-Tick Sampling Pipeline
//
// raw EMG -> filter update -> threshold latch -> timestamped SampleRecord.
// Runs on the sampling task only; the record it returns is the sole view the
// telemetry side ever gets of detector state.

use crate::config::EMG_WINDOW_SAMPLES;
use crate::emg::Emg;
use crate::events::{Gesture, SampleRecord};

/// Reduce a 12-bit ADC reading to the one-byte record field.
pub fn adc_to_byte(raw: u16) -> u8 {
    (raw.min(0x0FFF) >> 4) as u8
}

/// Outcome of one sample tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub record: SampleRecord,
    /// The latch went from rest to active on this sample.
    pub onset: bool,
}

pub struct SamplingPipeline {
    emg: Emg<EMG_WINDOW_SAMPLES>,
    delta_percent: u8,
    ticks: u16,
    seeded: bool,
}

impl SamplingPipeline {
    pub const fn new(delta_percent: u8) -> Self {
        Self {
            emg: Emg::new(),
            delta_percent,
            ticks: 0,
            seeded: false,
        }
    }

    /// Process one EMG reading together with the latest auxiliary readings.
    ///
    /// The first reading after power-on seeds the moving average, so a
    /// resting signal is not reported as a gesture while the filter settles.
    pub fn process(&mut self, raw_emg: u32, motor_current: u8, battery_voltage: u8) -> Tick {
        if !self.seeded {
            self.emg.seed(raw_emg);
            self.seeded = true;
        }
        let was_active = self.emg.is_active();

        self.emg.update(raw_emg);
        let active = self.emg.evaluate(raw_emg, self.delta_percent);

        let record = SampleRecord {
            timestamp: self.ticks,
            gesture: Gesture::from(active),
            motor_current,
            battery_voltage,
        };
        self.ticks = self.ticks.wrapping_add(1);

        Tick {
            record,
            onset: active && !was_active,
        }
    }

    /// Account for a tick with no usable EMG reading. The next record's
    /// timestamp jumps by one so the receiver sees the gap.
    pub fn skip_tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Current moving-average estimate (diagnostics).
    pub fn baseline(&self) -> u32 {
        self.emg.average()
    }
}
