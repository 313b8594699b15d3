// MyoBand - Sampling Task
//
// Reads the EMG channel every tick (~250 Hz), runs the filter/threshold
// pipeline, appends the record to the sample ring, and drives the motor while
// a gesture is held.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::config::*;
use crate::drivers::adc::{self, SharedAdc};
use crate::drivers::motor::Motor;
use crate::pipeline::{adc_to_byte, SamplingPipeline};
use crate::ring::SharedRing;

pub fn sampling_task<PH, SL, PW>(
    adc_unit: SharedAdc,
    ring: &'static SharedRing<SAMPLE_RING_CAPACITY>,
    battery: Arc<AtomicU8>,
    mut motor: Motor<PH, SL, PW>,
) where
    PH: OutputPin,
    SL: OutputPin,
    PW: SetDutyCycle,
{
    log::info!(
        "Sampling task started (window {} samples, delta {}%)",
        EMG_WINDOW_SAMPLES,
        EMG_DELTA_PERCENT
    );

    let interval = Duration::from_millis(EMG_SAMPLE_INTERVAL_MS);
    let mut pipeline = SamplingPipeline::new(EMG_DELTA_PERCENT);
    let mut motor_current = 0u8;

    loop {
        let tick_start = Instant::now();

        match adc::read_channel(adc_unit, ADC_CHANNEL_EMG) {
            Ok(raw) => {
                // Keep the last good current reading on a failed conversion.
                match adc::read_channel(adc_unit, ADC_CHANNEL_MOTOR_CURRENT) {
                    Ok(current) => motor_current = adc_to_byte(current),
                    Err(e) => log::warn!("Motor current read error: {}", e),
                }

                let tick = pipeline.process(
                    u32::from(raw),
                    motor_current,
                    battery.load(Ordering::Relaxed),
                );
                ring.append(tick.record);

                if tick.onset {
                    log::info!(
                        "Gesture onset at t={} (baseline {})",
                        tick.record.timestamp,
                        pipeline.baseline()
                    );
                }
                if tick.record.gesture.is_active() {
                    motor.start_forward();
                }
            }
            Err(e) => {
                pipeline.skip_tick();
                log::warn!("EMG read error: {}", e);
            }
        }

        if motor.tick() >= MOTOR_RUN_TICKS {
            motor.stop();
        }

        // Sleep for the remainder of the sampling interval.
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}
