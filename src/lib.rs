// MyoBand - EMG Gesture Band Firmware
//
// The signal pipeline, sample ring, frame packer and motor state machine are
// portable and tested on the host. Drivers and tasks that talk to ESP-IDF are
// only built for the device.

pub mod config;
pub mod drivers;
pub mod emg;
pub mod events;
pub mod frame;
pub mod pipeline;
pub mod ring;

#[cfg(target_os = "espidf")]
pub mod tasks;
