//! Protocol parsers.
//!
//! Device side:
//! - Control update (host → device): `<index>:<value>\n`
//!
//! Host side (used by tooling and tests):
//! - Report frame: `R<4 raw bytes per reporter>`
//! - Debug frame: `D<text>\0`

use crate::types::{
    ControlUpdate, ControlValue, Sample, DEBUG_TAG, DEBUG_TERMINATOR, REPORT_TAG, SAMPLE_SIZE,
};
use core::slice::ChunksExact;

/// Maximum control-update line length, excluding the newline.
pub const MAX_LINE_LENGTH: usize = 32;

/// Error type for control-update parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Nothing but a line terminator.
    Empty,
    /// The line is not valid UTF-8.
    NotUtf8,
    /// The index token is not a decimal integer in range.
    InvalidIndex,
    /// A non-negative index without a `:value` part.
    MissingValue,
    /// The value is neither `true`, `false` nor a finite decimal number.
    InvalidValue,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::NotUtf8 => write!(f, "line is not utf-8"),
            Self::InvalidIndex => write!(f, "invalid control index"),
            Self::MissingValue => write!(f, "missing control value"),
            Self::InvalidValue => write!(f, "invalid control value"),
        }
    }
}

/// Parse a control-update line.
///
/// # Protocol Format
///
/// ```text
/// <index>:<value>\n
/// ```
///
/// - `index` - signed decimal; any negative index is a disconnect request and
///   the value (which may be absent) is ignored
/// - `value` - `true`, `false`, or a decimal float
/// - `\n` - Line terminator (CR ignored if present)
///
/// # Example
///
/// ```
/// use livetune_proto::{parse_control_update, ControlUpdate, ControlValue};
///
/// assert_eq!(
///     parse_control_update(b"2:true\n"),
///     Ok(ControlUpdate::Set { index: 2, value: ControlValue::Bool(true) })
/// );
/// assert_eq!(parse_control_update(b"-1:0\n"), Ok(ControlUpdate::Disconnect));
/// ```
pub fn parse_control_update(line: &[u8]) -> Result<ControlUpdate, ParseError> {
    let line = strip_line_ending(line);
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let text = core::str::from_utf8(line).map_err(|_| ParseError::NotUtf8)?;
    let (index, value) = match text.split_once(':') {
        Some((index, value)) => (index, Some(value)),
        None => (text, None),
    };

    let index = index.trim_matches(' ');
    let index: i32 = match index.parse() {
        Ok(index) => index,
        // Too negative for i32 is still negative.
        Err(_) if is_negative_integer(index) => return Ok(ControlUpdate::Disconnect),
        Err(_) => return Err(ParseError::InvalidIndex),
    };
    if index < 0 {
        return Ok(ControlUpdate::Disconnect);
    }
    let index = u16::try_from(index).map_err(|_| ParseError::InvalidIndex)?;

    let value = parse_value(value.ok_or(ParseError::MissingValue)?)?;
    Ok(ControlUpdate::Set { index, value })
}

/// `-` followed by at least one ASCII digit.
fn is_negative_integer(token: &str) -> bool {
    token
        .strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Parse a control value token.
///
/// The boolean literals are matched exactly; everything else goes through
/// the float parser. Non-finite numbers are rejected.
pub fn parse_value(token: &str) -> Result<ControlValue, ParseError> {
    match token {
        "true" => Ok(ControlValue::Bool(true)),
        "false" => Ok(ControlValue::Bool(false)),
        other => {
            let value: f32 = other
                .trim_matches(' ')
                .parse()
                .map_err(|_| ParseError::InvalidValue)?;
            if !value.is_finite() {
                return Err(ParseError::InvalidValue);
            }
            Ok(ControlValue::Number(value))
        }
    }
}

/// Strip trailing CR and/or LF from a line.
#[inline]
#[must_use]
pub fn strip_line_ending(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}

// ---------------------------------------------------------------------------
// Device → host frames
// ---------------------------------------------------------------------------

/// Error type for frame decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Zero-length input.
    Empty,
    /// The first byte is not a known frame tag.
    UnknownTag(u8),
    /// Report payload is not a whole number of samples.
    Truncated,
    /// Debug frame without its zero terminator.
    Unterminated,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::UnknownTag(tag) => write!(f, "unknown frame tag 0x{:02X}", tag),
            Self::Truncated => write!(f, "truncated report frame"),
            Self::Unterminated => write!(f, "unterminated debug frame"),
        }
    }
}

/// A decoded device-to-host frame.
#[derive(Debug, Clone)]
pub enum Frame<'a> {
    /// Reporter snapshot.
    Report(ReportSamples<'a>),
    /// Debug text (without tag or terminator).
    Debug(&'a [u8]),
}

/// Iterator over the samples of a report frame, in registration order.
#[derive(Debug, Clone)]
pub struct ReportSamples<'a> {
    chunks: ChunksExact<'a, u8>,
}

impl Iterator for ReportSamples<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let chunk = self.chunks.next()?;
        let mut raw = [0u8; SAMPLE_SIZE];
        raw.copy_from_slice(chunk);
        Some(Sample(raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for ReportSamples<'_> {}

/// Decode a report frame (`R` followed by N×4 bytes).
pub fn parse_report(frame: &[u8]) -> Result<ReportSamples<'_>, FrameError> {
    let (&tag, payload) = frame.split_first().ok_or(FrameError::Empty)?;
    if tag != REPORT_TAG {
        return Err(FrameError::UnknownTag(tag));
    }
    if payload.len() % SAMPLE_SIZE != 0 {
        return Err(FrameError::Truncated);
    }
    Ok(ReportSamples {
        chunks: payload.chunks_exact(SAMPLE_SIZE),
    })
}

/// Decode a debug frame (`D`, text, zero byte).
pub fn parse_debug(frame: &[u8]) -> Result<&[u8], FrameError> {
    let (&tag, payload) = frame.split_first().ok_or(FrameError::Empty)?;
    if tag != DEBUG_TAG {
        return Err(FrameError::UnknownTag(tag));
    }
    match payload.split_last() {
        Some((&DEBUG_TERMINATOR, text)) => Ok(text),
        _ => Err(FrameError::Unterminated),
    }
}

/// Decode either frame type, dispatching on the tag byte.
pub fn parse_frame(frame: &[u8]) -> Result<Frame<'_>, FrameError> {
    match frame.first() {
        None => Err(FrameError::Empty),
        Some(&REPORT_TAG) => parse_report(frame).map(Frame::Report),
        Some(&DEBUG_TAG) => parse_debug(frame).map(Frame::Debug),
        Some(&tag) => Err(FrameError::UnknownTag(tag)),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;

    fn set(index: u16, value: ControlValue) -> Result<ControlUpdate, ParseError> {
        Ok(ControlUpdate::Set { index, value })
    }

    #[test]
    fn test_parse_bool_values() {
        assert_eq!(parse_control_update(b"2:true\n"), set(2, ControlValue::Bool(true)));
        assert_eq!(parse_control_update(b"2:false\n"), set(2, ControlValue::Bool(false)));
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_parse_float_value() {
        assert_eq!(parse_control_update(b"2:3.14\n"), set(2, ControlValue::Number(3.14)));
        assert_eq!(parse_control_update(b"0:-12\n"), set(0, ControlValue::Number(-12.0)));
    }

    #[test]
    fn test_bool_literals_are_case_sensitive() {
        assert_eq!(parse_control_update(b"1:True\n"), Err(ParseError::InvalidValue));
        assert_eq!(parse_control_update(b"1:FALSE\n"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_negative_index_is_disconnect() {
        assert_eq!(parse_control_update(b"-1:0\n"), Ok(ControlUpdate::Disconnect));
        assert_eq!(parse_control_update(b"-5:garbage\n"), Ok(ControlUpdate::Disconnect));
        assert_eq!(parse_control_update(b"-1\n"), Ok(ControlUpdate::Disconnect));
    }

    #[test]
    fn test_negative_index_beyond_i32_is_disconnect() {
        assert_eq!(parse_control_update(b"-2147483649:0\n"), Ok(ControlUpdate::Disconnect));
        assert_eq!(
            parse_control_update(b"-99999999999999999999\n"),
            Ok(ControlUpdate::Disconnect)
        );
        assert_eq!(parse_control_update(b"-:0\n"), Err(ParseError::InvalidIndex));
        assert_eq!(parse_control_update(b"-1x:0\n"), Err(ParseError::InvalidIndex));
        assert_eq!(parse_control_update(b"-0:1\n"), set(0, ControlValue::Number(1.0)));
    }

    #[test]
    fn test_crlf_stripped() {
        assert_eq!(parse_control_update(b"3:1.5\r\n"), set(3, ControlValue::Number(1.5)));
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(parse_control_update(b"\n"), Err(ParseError::Empty));
        assert_eq!(parse_control_update(b""), Err(ParseError::Empty));
        assert_eq!(parse_control_update(b"x:1\n"), Err(ParseError::InvalidIndex));
        assert_eq!(parse_control_update(b":1\n"), Err(ParseError::InvalidIndex));
        assert_eq!(parse_control_update(b"70000:1\n"), Err(ParseError::InvalidIndex));
        assert_eq!(parse_control_update(b"4\n"), Err(ParseError::MissingValue));
        assert_eq!(parse_control_update(b"4:\n"), Err(ParseError::InvalidValue));
        assert_eq!(parse_control_update(b"4:abc\n"), Err(ParseError::InvalidValue));
        assert_eq!(parse_control_update(b"4:inf\n"), Err(ParseError::InvalidValue));
        assert_eq!(parse_control_update(&[b'1', b':', 0xFF, b'\n']), Err(ParseError::NotUtf8));
    }

    #[test]
    fn test_parse_report_frame() {
        let mut frame = Vec::from([REPORT_TAG]);
        frame.extend_from_slice(&2.5f32.to_le_bytes());
        frame.extend_from_slice(&(-3i32).to_le_bytes());

        let samples: Vec<Sample> = parse_report(&frame).unwrap().collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].as_f32(), 2.5);
        assert_eq!(samples[1].as_i32(), -3);
    }

    #[test]
    fn test_parse_report_truncated() {
        assert_eq!(
            parse_report(&[REPORT_TAG, 1, 2, 3]).map(|s| s.len()),
            Err(FrameError::Truncated)
        );
        assert_eq!(parse_report(&[]).map(|s| s.len()), Err(FrameError::Empty));
        assert_eq!(parse_report(b"D\0").map(|s| s.len()), Err(FrameError::UnknownTag(b'D')));
    }

    #[test]
    fn test_parse_debug_frame() {
        assert_eq!(parse_debug(b"Dhello\0"), Ok(&b"hello"[..]));
        assert_eq!(parse_debug(b"Dhello"), Err(FrameError::Unterminated));
    }

    #[test]
    fn test_parse_frame_dispatch() {
        assert!(matches!(parse_frame(b"R"), Ok(Frame::Report(s)) if s.len() == 0));
        assert!(matches!(parse_frame(b"Dok\0"), Ok(Frame::Debug(text)) if text == b"ok"));
        assert!(matches!(parse_frame(b"X"), Err(FrameError::UnknownTag(b'X'))));
    }
}
