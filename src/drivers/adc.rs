// MyoBand - ADC1 One-Shot Driver
//
// Thin wrapper over the ESP-IDF oneshot ADC API. One unit handle serves the
// EMG, motor-current and battery channels, so tasks share it behind a mutex
// the same way the I2C bus was shared on PlastiWatch.

use std::sync::{Mutex, PoisonError};

use esp_idf_sys as sys;

use crate::config::ADC_MAX_RAW;

/// Thread-safe handle to the shared ADC unit.
pub type SharedAdc = &'static Mutex<OneshotAdc>;

pub struct OneshotAdc {
    handle: sys::adc_oneshot_unit_handle_t,
}

// SAFETY: the oneshot driver has no thread affinity; every access goes
// through the `SharedAdc` mutex.
unsafe impl Send for OneshotAdc {}

impl OneshotAdc {
    /// Claim ADC1 in oneshot mode.
    pub fn new() -> anyhow::Result<Self> {
        let mut handle: sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();
        let unit_cfg = sys::adc_oneshot_unit_init_cfg_t {
            unit_id: sys::adc_unit_t_ADC_UNIT_1,
            ulp_mode: sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            // SAFETY: all-zero is the documented default clock source.
            ..unsafe { core::mem::zeroed() }
        };
        sys::esp!(unsafe { sys::adc_oneshot_new_unit(&unit_cfg, &mut handle) })?;
        Ok(Self { handle })
    }

    /// 12-bit conversions with 11 dB attenuation (0-3.3 V range).
    pub fn configure(&mut self, channel: u32) -> anyhow::Result<()> {
        let chan_cfg = sys::adc_oneshot_chan_cfg_t {
            atten: sys::adc_atten_t_ADC_ATTEN_DB_11,
            bitwidth: sys::adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        sys::esp!(unsafe {
            sys::adc_oneshot_config_channel(self.handle, channel as sys::adc_channel_t, &chan_cfg)
        })?;
        Ok(())
    }

    pub fn read(&mut self, channel: u32) -> anyhow::Result<u16> {
        let mut raw: i32 = 0;
        sys::esp!(unsafe {
            sys::adc_oneshot_read(self.handle, channel as sys::adc_channel_t, &mut raw)
        })?;
        Ok(raw.clamp(0, ADC_MAX_RAW as i32) as u16)
    }
}

impl Drop for OneshotAdc {
    fn drop(&mut self) {
        unsafe {
            sys::adc_oneshot_del_unit(self.handle);
        }
    }
}

/// Lock the shared unit for a single conversion.
pub fn read_channel(adc: SharedAdc, channel: u32) -> anyhow::Result<u16> {
    adc.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .read(channel)
}
