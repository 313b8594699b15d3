// MyoBand - Battery Monitor Task
//
// Periodically reads the battery divider and publishes the raw byte that
// every sample record carries.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::*;
use crate::drivers::adc::{self, SharedAdc};
use crate::pipeline::adc_to_byte;

pub fn power_task(adc_unit: SharedAdc, battery: Arc<AtomicU8>) {
    log::info!("Power task started");

    let check_interval = Duration::from_millis(BATTERY_CHECK_INTERVAL_MS);

    loop {
        match adc::read_channel(adc_unit, ADC_CHANNEL_BATTERY) {
            Ok(raw) => {
                let level = adc_to_byte(raw);
                battery.store(level, Ordering::Relaxed);

                // Assumes a 1:2 resistor divider before the ADC pin.
                let voltage = (raw as f32 / ADC_MAX_RAW as f32) * 3.3 * 2.0;
                log::info!("Battery {:.2} V (raw byte {})", voltage, level);
            }
            Err(e) => {
                log::warn!("Battery read error: {}", e);
            }
        }

        thread::sleep(check_interval);
    }
}
