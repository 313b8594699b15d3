// MyoBand - Firmware Entry Point
//
// Boot sequence:
//   1. Claim ADC1 and configure the EMG, motor-current and battery channels.
//   2. Bring up the motor bridge (PHASE / nSLEEP GPIOs, LEDC PWM, duty 0).
//   3. Take one battery reading so the first records carry a real value.
//   4. Spawn sampling, telemetry and power tasks.

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::atomic::AtomicU8;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::{OutputPin, PinDriver};
    use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver};
    use esp_idf_hal::prelude::*;

    use myoband::config::*;
    use myoband::drivers::adc::{self, OneshotAdc, SharedAdc};
    use myoband::drivers::motor::Motor;
    use myoband::pipeline::adc_to_byte;
    use myoband::ring::SharedRing;
    use myoband::tasks;

    static SAMPLE_RING: SharedRing<SAMPLE_RING_CAPACITY> = SharedRing::new();

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("MyoBand firmware starting");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    // ---- ADC1 (shared by the sampling and power tasks) --------------------
    let mut oneshot = OneshotAdc::new()?;
    for channel in [ADC_CHANNEL_EMG, ADC_CHANNEL_MOTOR_CURRENT, ADC_CHANNEL_BATTERY] {
        oneshot.configure(channel)?;
    }
    // The ADC unit lives for the whole programme (firmware never exits).
    let adc_unit: SharedAdc = Box::leak(Box::new(Mutex::new(oneshot)));

    // ---- Motor bridge -----------------------------------------------------
    // Pin fields must match PIN_MOTOR_PHASE / PIN_MOTOR_SLEEP / PIN_MOTOR_PWM.
    const _: () = assert!(PIN_MOTOR_PHASE == 5 && PIN_MOTOR_SLEEP == 6 && PIN_MOTOR_PWM == 7);
    let phase = PinDriver::output(peripherals.pins.gpio5.downgrade_output())?;
    let sleep = PinDriver::output(peripherals.pins.gpio6.downgrade_output())?;
    let pwm_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::new().frequency(MOTOR_PWM_FREQUENCY_KHZ.kHz().into()),
    )?;
    let pwm = LedcDriver::new(peripherals.ledc.channel0, &pwm_timer, peripherals.pins.gpio7)?;
    let motor = Motor::new(phase, sleep, pwm, MOTOR_DRIVE_DUTY_PERCENT);
    log::info!(
        "Motor bridge on GPIO{}/{}/{} @ {} kHz",
        PIN_MOTOR_PHASE,
        PIN_MOTOR_SLEEP,
        PIN_MOTOR_PWM,
        MOTOR_PWM_FREQUENCY_KHZ
    );

    // ---- Shared state -----------------------------------------------------
    let initial_battery = match adc::read_channel(adc_unit, ADC_CHANNEL_BATTERY) {
        Ok(raw) => adc_to_byte(raw),
        Err(e) => {
            log::warn!("Initial battery read failed: {}", e);
            0
        }
    };
    let battery = Arc::new(AtomicU8::new(initial_battery));

    // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------

    // Sampling task: tightest timing, owns the pipeline and the motor.
    let sampling_battery = Arc::clone(&battery);
    thread::Builder::new()
        .name("sampling".into())
        .stack_size(STACK_SAMPLING)
        .spawn(move || {
            tasks::sampling::sampling_task(adc_unit, &SAMPLE_RING, sampling_battery, motor);
        })?;

    thread::Builder::new()
        .name("telemetry".into())
        .stack_size(STACK_TELEMETRY)
        .spawn(|| {
            tasks::telemetry::telemetry_task(&SAMPLE_RING, tasks::telemetry::LogLink);
        })?;

    thread::Builder::new()
        .name("power".into())
        .stack_size(STACK_POWER)
        .spawn(move || {
            tasks::power::power_task(adc_unit, battery);
        })?;

    log::info!("Boot complete - entering normal operation");

    // Main thread has nothing left to do, but parking it here keeps the LEDC
    // timer driver alive for the motor PWM.
    let _pwm_timer = pwm_timer;
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!("myoband targets ESP-IDF (riscv32imc-esp-espidf); run `cargo test` for the host-side pipeline tests");
}
