//! Builder API for host-side control messages.
//!
//! # Example
//!
//! ```
//! use livetune_proto::MessageBuilder;
//!
//! let mut buf = [0u8; 32];
//! let len = MessageBuilder::control(3)
//!     .number(0.5)
//!     .serialize(&mut buf)
//!     .unwrap();
//! assert_eq!(&buf[..len], b"3:0.5\n");
//!
//! let len = MessageBuilder::disconnect().serialize(&mut buf).unwrap();
//! assert_eq!(&buf[..len], b"-1:0\n");
//! ```

use crate::serialize::{Serialize, SerializeError};
use crate::types::{ControlUpdate, ControlValue};

/// Entry point for building control messages.
pub struct MessageBuilder;

impl MessageBuilder {
    /// Start building an update for the control at `index`.
    ///
    /// Exactly one value setter must be called before serializing.
    #[must_use]
    pub fn control(index: u16) -> ControlBuilder {
        ControlBuilder { index, value: None }
    }

    /// A disconnect request.
    #[must_use]
    pub fn disconnect() -> DisconnectBuilder {
        DisconnectBuilder
    }

    /// Both axis updates for a joystick whose x axis sits at `index`.
    pub fn joystick(index: u16, x: f32, y: f32) -> [ControlUpdate; 2] {
        [
            ControlUpdate::Set {
                index,
                value: ControlValue::Number(x),
            },
            ControlUpdate::Set {
                index: index.wrapping_add(1),
                value: ControlValue::Number(y),
            },
        ]
    }
}

/// Builder for a single control update.
///
/// Created via [`MessageBuilder::control()`]. Calling several setters keeps
/// only the last value.
#[derive(Debug, Clone)]
pub struct ControlBuilder {
    index: u16,
    value: Option<ControlValue>,
}

impl ControlBuilder {
    /// Set a toggle or button state.
    #[must_use]
    pub fn boolean(mut self, on: bool) -> Self {
        self.value = Some(ControlValue::Bool(on));
        self
    }

    /// Set a slider or joystick axis value.
    #[must_use]
    pub fn number(mut self, value: f32) -> Self {
        self.value = Some(ControlValue::Number(value));
        self
    }

    /// Get the built update without serializing.
    ///
    /// Returns `None` if no value was set.
    #[must_use]
    pub fn build(self) -> Option<ControlUpdate> {
        let value = self.value?;
        Some(ControlUpdate::Set {
            index: self.index,
            value,
        })
    }

    /// Serialize the message to the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if the buffer is too small,
    /// or if no value was set (nothing to serialize).
    pub fn serialize(self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        self.build()
            .ok_or(SerializeError::BufferTooSmall)?
            .serialize(buf)
    }

    /// Serialize to a `heapless::Vec`.
    #[cfg(feature = "heapless")]
    pub fn serialize_to_vec<const N: usize>(self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        self.build()
            .ok_or(SerializeError::BufferTooSmall)?
            .serialize_to_vec()
    }

    /// Serialize to an `embedded_io::Write` implementation.
    #[cfg(feature = "embedded-io")]
    pub fn serialize_io<W: embedded_io::Write>(self, writer: &mut W) -> Result<(), SerializeError> {
        self.build()
            .ok_or(SerializeError::BufferTooSmall)?
            .serialize_io(writer)
    }
}

/// Builder for the disconnect request.
#[derive(Debug, Clone, Copy)]
pub struct DisconnectBuilder;

impl DisconnectBuilder {
    #[must_use]
    pub fn build(self) -> ControlUpdate {
        ControlUpdate::Disconnect
    }

    /// Serialize the message to the provided buffer.
    pub fn serialize(self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        ControlUpdate::Disconnect.serialize(buf)
    }
}
