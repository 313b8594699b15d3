// MyoBand - DC Motor Driver (DRV8838-style: PHASE, nSLEEP, PWM ENABLE)
//
// Generic over embedded-hal pins so the state machine runs on the host with
// mock outputs. On the device these are esp-idf-hal `PinDriver`s and a
// `LedcDriver`.

use embedded_hal::digital::{Error as _, OutputPin};
use embedded_hal::pwm::{Error as _, SetDutyCycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Idle,
    Moving,
}

pub struct Motor<PH, SL, PW> {
    phase: PH,
    sleep: SL,
    pwm: PW,
    drive_duty_percent: u8,
    state: MotorState,
    /// Ticks since the last `start_forward()`.
    elapsed: u32,
}

impl<PH, SL, PW> Motor<PH, SL, PW>
where
    PH: OutputPin,
    SL: OutputPin,
    PW: SetDutyCycle,
{
    /// Takes ownership of already-configured outputs. The driver is assumed
    /// off (PWM duty 0) at construction.
    pub fn new(phase: PH, sleep: SL, pwm: PW, drive_duty_percent: u8) -> Self {
        Self {
            phase,
            sleep,
            pwm,
            drive_duty_percent: drive_duty_percent.min(100),
            state: MotorState::Idle,
            elapsed: 0,
        }
    }

    /// Start driving forward, or refresh the run timer if already moving.
    ///
    /// Only the `Idle -> Moving` transition touches the hardware.
    pub fn start_forward(&mut self) {
        if self.state == MotorState::Idle {
            if let Err(e) = self.phase.set_high() {
                log::warn!("Motor PHASE write failed: {:?}", e.kind());
            }
            if let Err(e) = self.sleep.set_high() {
                log::warn!("Motor nSLEEP write failed: {:?}", e.kind());
            }
            if let Err(e) = self.pwm.set_duty_cycle_percent(self.drive_duty_percent) {
                log::warn!("Motor PWM start failed: {:?}", e.kind());
            }
            self.state = MotorState::Moving;
            log::info!("Motor started ({}% duty)", self.drive_duty_percent);
        }
        self.elapsed = 0;
    }

    /// Cut the drive and put the bridge to sleep. No-op when idle.
    pub fn stop(&mut self) {
        if self.state == MotorState::Moving {
            if let Err(e) = self.pwm.set_duty_cycle_fully_off() {
                log::warn!("Motor PWM stop failed: {:?}", e.kind());
            }
            if let Err(e) = self.sleep.set_low() {
                log::warn!("Motor nSLEEP write failed: {:?}", e.kind());
            }
            self.state = MotorState::Idle;
            log::info!("Motor stopped after {} ticks", self.elapsed);
        }
    }

    /// Advance the run timer by one sample tick; returns the new count.
    pub fn tick(&mut self) -> u32 {
        if self.state == MotorState::Moving {
            self.elapsed = self.elapsed.saturating_add(1);
        }
        self.elapsed
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }
}
