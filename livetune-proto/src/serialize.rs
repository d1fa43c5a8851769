//! Protocol serialization.
//!
//! This module provides the [`Serialize`] trait for the two messages that
//! carry live values:
//!
//! - [`ReportFrame`] (device → host): `R` followed by 4 raw bytes per reporter
//! - [`ControlUpdate`] (host → device): `<index>:<value>\n`
//!
//! # Example
//!
//! ```
//! use livetune_proto::{ReportFrame, Sample, Serialize};
//!
//! let samples = [Sample::from_f32(1.5), Sample::from_i32(7)];
//! let mut buf = [0u8; 16];
//! let len = ReportFrame::new(&samples).serialize(&mut buf).unwrap();
//!
//! assert_eq!(len, 9);
//! assert_eq!(buf[0], b'R');
//! assert_eq!(&buf[1..5], &1.5f32.to_le_bytes());
//! ```

use crate::parser::MAX_LINE_LENGTH;
use crate::types::{ControlUpdate, ControlValue, Sample, REPORT_TAG, SAMPLE_SIZE};
use core::fmt::Write;

/// Maximum size of a serialized control update, newline included.
pub const MAX_UPDATE_SIZE: usize = MAX_LINE_LENGTH + 1;

/// Cursor over an output buffer that tracks how much has been written.
struct SerializeBuf<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SerializeBuf<'a> {
    #[inline]
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn write_slice(&mut self, bytes: &[u8]) -> Result<(), SerializeError> {
        let end = self.pos + bytes.len();
        let dst = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(SerializeError::BufferTooSmall)?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    #[inline]
    fn finalize(self) -> usize {
        self.pos
    }
}

impl Write for SerializeBuf<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.write_slice(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}

/// Error type for serialization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// The output buffer is too small to hold the serialized message.
    BufferTooSmall,
    /// A write operation failed (for I/O adapters).
    WriteError,
}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteError => write!(f, "write error"),
        }
    }
}

/// Extension trait for serializing protocol messages.
pub trait Serialize {
    /// Serialize to the provided buffer.
    ///
    /// Returns the number of bytes written on success.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if the buffer is not large enough.
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError>;

    /// Serialize to a `heapless::Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::BufferTooSmall`] if `N` is not large enough.
    #[cfg(feature = "heapless")]
    fn serialize_to_vec<const N: usize>(&self) -> Result<heapless::Vec<u8, N>, SerializeError> {
        let mut vec = heapless::Vec::new();
        // Resize to full capacity to allow serialize() to write
        vec.resize(N, 0)
            .map_err(|_| SerializeError::BufferTooSmall)?;
        let len = self.serialize(&mut vec)?;
        vec.truncate(len);
        Ok(vec)
    }

    /// Serialize to an `embedded_io::Write` implementation.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::WriteError`] if the write fails.
    #[cfg(feature = "embedded-io")]
    fn serialize_io<W: embedded_io::Write>(&self, writer: &mut W) -> Result<(), SerializeError>;
}

/// A reporter snapshot borrowed from already-sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFrame<'s> {
    samples: &'s [Sample],
}

impl<'s> ReportFrame<'s> {
    #[must_use]
    pub const fn new(samples: &'s [Sample]) -> Self {
        Self { samples }
    }

    /// Encoded size: tag byte plus four bytes per sample.
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        1 + SAMPLE_SIZE * self.samples.len()
    }

    #[must_use]
    pub const fn samples(&self) -> &'s [Sample] {
        self.samples
    }
}

impl Serialize for ReportFrame<'_> {
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        if buf.len() < self.encoded_len() {
            return Err(SerializeError::BufferTooSmall);
        }

        let mut sb = SerializeBuf::new(buf);
        sb.write_slice(&[REPORT_TAG])?;
        for sample in self.samples {
            sb.write_slice(&sample.bytes())?;
        }
        Ok(sb.finalize())
    }

    #[cfg(feature = "embedded-io")]
    fn serialize_io<W: embedded_io::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        writer
            .write_all(&[REPORT_TAG])
            .map_err(|_| SerializeError::WriteError)?;
        for sample in self.samples {
            writer
                .write_all(&sample.bytes())
                .map_err(|_| SerializeError::WriteError)?;
        }
        Ok(())
    }
}

impl Serialize for ControlUpdate {
    fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        let mut sb = SerializeBuf::new(buf);
        let written = match self {
            Self::Disconnect => sb.write_str("-1:0"),
            Self::Set {
                index,
                value: ControlValue::Bool(b),
            } => write!(sb, "{}:{}", index, b),
            Self::Set {
                index,
                value: ControlValue::Number(v),
            } => write!(sb, "{}:{}", index, v),
        };
        written.map_err(|_| SerializeError::BufferTooSmall)?;
        sb.write_slice(b"\n")?;
        Ok(sb.finalize())
    }

    #[cfg(feature = "embedded-io")]
    fn serialize_io<W: embedded_io::Write>(&self, writer: &mut W) -> Result<(), SerializeError> {
        let mut buf = [0u8; MAX_UPDATE_SIZE];
        let len = self.serialize(&mut buf)?;
        writer
            .write_all(&buf[..len])
            .map_err(|_| SerializeError::WriteError)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::parser::{parse_control_update, parse_report};

    #[test]
    fn test_report_frame_layout() {
        let samples = [Sample::from_f32(3.25), Sample::from_i32(-2)];
        let mut buf = [0u8; 16];
        let len = ReportFrame::new(&samples).serialize(&mut buf).unwrap();

        assert_eq!(len, 9);
        assert_eq!(buf[0], REPORT_TAG);
        assert_eq!(&buf[1..5], &3.25f32.to_le_bytes());
        assert_eq!(&buf[5..9], &(-2i32).to_le_bytes());
    }

    #[test]
    fn test_report_frame_round_trip() {
        let values = [0.0f32, -1.5, 1e-7, 12345.678, f32::MAX];
        let samples: Vec<Sample> = values.iter().copied().map(Sample::from_f32).collect();
        let mut buf = [0u8; 32];
        let len = ReportFrame::new(&samples).serialize(&mut buf).unwrap();

        let decoded: Vec<f32> = parse_report(&buf[..len])
            .unwrap()
            .map(Sample::as_f32)
            .collect();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_empty_report_frame() {
        let mut buf = [0u8; 1];
        assert_eq!(ReportFrame::new(&[]).serialize(&mut buf), Ok(1));
        assert_eq!(buf, [REPORT_TAG]);
    }

    #[test]
    fn test_report_frame_buffer_too_small() {
        let samples = [Sample::from_f32(1.0)];
        let mut buf = [0u8; 4];
        assert_eq!(
            ReportFrame::new(&samples).serialize(&mut buf),
            Err(SerializeError::BufferTooSmall)
        );
    }

    #[test]
    fn test_serialize_control_updates() {
        let mut buf = [0u8; MAX_UPDATE_SIZE];

        let update = ControlUpdate::Set {
            index: 2,
            value: ControlValue::Bool(true),
        };
        let len = update.serialize(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"2:true\n");
        assert_eq!(parse_control_update(&buf[..len]), Ok(update));

        let update = ControlUpdate::Set {
            index: 7,
            value: ControlValue::Number(2.75),
        };
        let len = update.serialize(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"7:2.75\n");
        assert_eq!(parse_control_update(&buf[..len]), Ok(update));

        let len = ControlUpdate::Disconnect.serialize(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"-1:0\n");
    }

    #[test]
    fn test_serialize_control_update_buffer_too_small() {
        let update = ControlUpdate::Set {
            index: 1,
            value: ControlValue::Bool(false),
        };
        let mut buf = [0u8; 4];
        assert_eq!(update.serialize(&mut buf), Err(SerializeError::BufferTooSmall));
    }

    #[cfg(feature = "heapless")]
    #[test]
    fn test_serialize_to_vec() {
        let samples = [Sample::from_f32(1.5)];
        let frame = ReportFrame::new(&samples).serialize_to_vec::<8>().unwrap();
        assert_eq!(frame.len(), 5);
        assert_eq!(frame[0], REPORT_TAG);
        assert_eq!(&frame[1..], &1.5f32.to_le_bytes());

        assert!(matches!(
            ReportFrame::new(&samples).serialize_to_vec::<4>(),
            Err(SerializeError::BufferTooSmall)
        ));
    }

    #[cfg(feature = "embedded-io")]
    #[test]
    fn test_serialize_io_writes_same_bytes() {
        let update = ControlUpdate::Set {
            index: 3,
            value: ControlValue::Number(-0.5),
        };
        let mut out = [0u8; 16];
        let mut writer: &mut [u8] = &mut out;
        update.serialize_io(&mut writer).unwrap();
        let written = 16 - writer.len();
        assert_eq!(&out[..written], b"3:-0.5\n");

        let samples = [Sample::from_i32(7)];
        let mut out = [0u8; 16];
        let mut writer: &mut [u8] = &mut out;
        ReportFrame::new(&samples).serialize_io(&mut writer).unwrap();
        let written = 16 - writer.len();
        assert_eq!(&out[..written], &[REPORT_TAG, 7, 0, 0, 0]);
    }
}
