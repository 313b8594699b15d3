pub mod power;
pub mod sampling;
pub mod telemetry;
