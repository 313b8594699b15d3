// MyoBand - Sample Records & Data Types

// ---------------------------------------------------------------------------
// Gesture Classification
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Gesture {
    #[default]
    Rest = 0,
    Active = 1,
}

impl Gesture {
    /// One-byte code carried in the telemetry frame.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Unknown codes decode as `Rest`.
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Active,
            _ => Self::Rest,
        }
    }

    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<bool> for Gesture {
    fn from(active: bool) -> Self {
        if active {
            Self::Active
        } else {
            Self::Rest
        }
    }
}

// ---------------------------------------------------------------------------
// Sample Record (one entry of the sample ring, one telemetry frame)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleRecord {
    /// Sampling tick, wraps at 65536.
    pub timestamp: u16,
    pub gesture: Gesture,
    /// Raw sensed units (ADC reading >> 4).
    pub motor_current: u8,
    /// Raw sensed units (ADC reading >> 4).
    pub battery_voltage: u8,
}

impl SampleRecord {
    pub const EMPTY: Self = Self {
        timestamp: 0,
        gesture: Gesture::Rest,
        motor_current: 0,
        battery_voltage: 0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_codes_match_wire_values() {
        assert_eq!(Gesture::Rest.code(), 0);
        assert_eq!(Gesture::Active.code(), 1);
        assert_eq!(Gesture::from_code(1), Gesture::Active);
        assert_eq!(Gesture::from_code(0), Gesture::Rest);
        assert_eq!(Gesture::from_code(0x7F), Gesture::Rest);
    }

    #[test]
    fn gesture_from_latch_state() {
        assert!(Gesture::from(true).is_active());
        assert!(!Gesture::from(false).is_active());
    }
}
