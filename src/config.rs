// MyoBand - Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V)

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// main.rs takes `peripherals.pins.gpio5/6/7` by name; change both together.
// ---------------------------------------------------------------------------
pub const PIN_MOTOR_PHASE: i32 = 5;  // D3    - DRV8838 PHASE (direction)
pub const PIN_MOTOR_SLEEP: i32 = 6;  // D4    - DRV8838 nSLEEP (driver enable)
pub const PIN_MOTOR_PWM: i32 = 7;    // D5    - DRV8838 ENABLE (LEDC PWM)

// ---------------------------------------------------------------------------
// ADC1 Channels (ADC1_CHn is GPIOn on the C3)
// ---------------------------------------------------------------------------
pub const ADC_CHANNEL_EMG: u32 = 2;            // D0/A0 - EMG envelope front-end
pub const ADC_CHANNEL_MOTOR_CURRENT: u32 = 3;  // D1/A1 - motor shunt amplifier
pub const ADC_CHANNEL_BATTERY: u32 = 4;        // D2/A2 - battery voltage (1:2 divider)
pub const ADC_MAX_RAW: u32 = 4095;             // 12-bit conversions

// ---------------------------------------------------------------------------
// EMG Pipeline
// ---------------------------------------------------------------------------
/// Number of samples the running sum stands in for.
pub const EMG_WINDOW_SAMPLES: u32 = 32;
/// Band above the moving average a sample must exceed to count as a gesture.
pub const EMG_DELTA_PERCENT: u8 = 30;

// The accumulator settles near `average * window` and can sit one full
// window above that, so the worst case must still fit in 32 bits.
const _: () = assert!(
    (ADC_MAX_RAW as u64) * (EMG_WINDOW_SAMPLES as u64 + 1) <= u32::MAX as u64,
    "EMG_WINDOW_SAMPLES too large for a 32-bit accumulator"
);
const _: () = assert!(EMG_WINDOW_SAMPLES > 0);

// ---------------------------------------------------------------------------
// Sample Ring Buffer
// ---------------------------------------------------------------------------
pub const SAMPLE_RING_CAPACITY: usize = 256; // ~1 s of history @ 250 Hz

// ---------------------------------------------------------------------------
// Outbound Telemetry Buffer
// ---------------------------------------------------------------------------
pub const TX_HEADER_BYTES: usize = 2;   // link-layer preamble, filled by the radio stack
pub const FRAME_BYTES: usize = 5;       // ts_hi, ts_lo, gesture, motor_current, battery
pub const FRAMES_PER_PACKET: usize = 48;
pub const TX_BUFFER_LEN: usize = TX_HEADER_BYTES + FRAMES_PER_PACKET * FRAME_BYTES; // 242

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_SAMPLING: usize = 4096;
pub const STACK_TELEMETRY: usize = 4096;
pub const STACK_POWER: usize = 3072;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
pub const EMG_SAMPLE_INTERVAL_MS: u64 = 4;       // 250 Hz
pub const TELEMETRY_INTERVAL_MS: u64 = 100;      // 25 frames per drain at 250 Hz
pub const BATTERY_CHECK_INTERVAL_MS: u64 = 10_000;
pub const MOTOR_RUN_TICKS: u32 = 250;            // motor keeps running 1 s after the last active sample

// ---------------------------------------------------------------------------
// Motor Drive
// ---------------------------------------------------------------------------
pub const MOTOR_PWM_FREQUENCY_KHZ: u32 = 20;     // above audible range
pub const MOTOR_DRIVE_DUTY_PERCENT: u8 = 80;
