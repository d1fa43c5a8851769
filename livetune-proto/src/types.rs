//! Core protocol types: Sample, ControlValue, ControlUpdate.

/// Line terminator; a lone terminator from the host is the handshake.
pub const HANDSHAKE: u8 = b'\n';

/// Leading byte of a reporter snapshot frame.
pub const REPORT_TAG: u8 = b'R';

/// Leading byte of a debug text frame.
pub const DEBUG_TAG: u8 = b'D';

/// Trailing byte of a debug text frame.
pub const DEBUG_TERMINATOR: u8 = 0;

/// Size in bytes of every sampled reporter value.
pub const SAMPLE_SIZE: usize = 4;

/// One reporter value as it appears on the wire.
///
/// Reporters are 32-bit scalars (`f32` or `i32`) and are transmitted as their
/// raw little-endian representation. The frame itself carries no type
/// information; the host learns each reporter's type from the schema.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample(pub [u8; SAMPLE_SIZE]);

impl Sample {
    /// Sample a 32-bit float.
    #[inline]
    #[must_use]
    pub const fn from_f32(value: f32) -> Self {
        Self(value.to_le_bytes())
    }

    /// Sample a 32-bit signed integer.
    #[inline]
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        Self(value.to_le_bytes())
    }

    /// Reinterpret the raw bytes as a float.
    #[inline]
    #[must_use]
    pub const fn as_f32(self) -> f32 {
        f32::from_le_bytes(self.0)
    }

    /// Reinterpret the raw bytes as a signed integer.
    #[inline]
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        i32::from_le_bytes(self.0)
    }

    /// Get the raw wire bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> [u8; SAMPLE_SIZE] {
        self.0
    }
}

/// Value carried by a control update, as inferred from its token.
///
/// `true` and `false` (exact, case-sensitive) are booleans; anything else
/// must parse as a decimal float.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlValue {
    Bool(bool),
    Number(f32),
}

impl ControlValue {
    /// Numeric view: booleans become `1.0` / `0.0`.
    #[inline]
    #[must_use]
    pub fn to_f32(self) -> f32 {
        match self {
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
            Self::Number(v) => v,
        }
    }

    /// Boolean view: numbers are true when non-zero.
    #[inline]
    #[must_use]
    pub fn to_bool(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Number(v) => v != 0.0,
        }
    }
}

/// A decoded host-to-device control message.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum ControlUpdate {
    /// Write `value` into the control registered at `index`.
    Set { index: u16, value: ControlValue },
    /// The host asked to end the session (negative index on the wire).
    Disconnect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_float_bits() {
        let s = Sample::from_f32(1.5);
        assert_eq!(s.bytes(), 1.5f32.to_le_bytes());
        assert_eq!(s.as_f32(), 1.5);
    }

    #[test]
    fn test_sample_int_bits() {
        let s = Sample::from_i32(-7);
        assert_eq!(s.bytes(), [0xF9, 0xFF, 0xFF, 0xFF]);
        assert_eq!(s.as_i32(), -7);
    }

    #[test]
    fn test_control_value_views() {
        assert_eq!(ControlValue::Bool(true).to_f32(), 1.0);
        assert_eq!(ControlValue::Bool(false).to_f32(), 0.0);
        assert!(ControlValue::Number(0.25).to_bool());
        assert!(!ControlValue::Number(0.0).to_bool());
    }
}
