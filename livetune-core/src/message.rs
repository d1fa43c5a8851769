//! Control-update line assembly and message errors.

use heapless::Vec;
use livetune_proto::{ParseError, HANDSHAKE, MAX_LINE_LENGTH};

/// Why an incoming control message was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// The line is not a valid control update.
    Syntax(ParseError),
    /// No control is registered at this index.
    UnknownIndex(u16),
    /// A boolean for a numeric control or a number for a boolean one.
    TypeMismatch(u16),
    /// The line exceeded [`MAX_LINE_LENGTH`] and was dropped.
    LineTooLong,
}

impl From<ParseError> for MessageError {
    fn from(e: ParseError) -> Self {
        Self::Syntax(e)
    }
}

impl core::fmt::Display for MessageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "syntax error: {}", e),
            Self::UnknownIndex(i) => write!(f, "no control at index {}", i),
            Self::TypeMismatch(i) => write!(f, "value type does not match control {}", i),
            Self::LineTooLong => write!(f, "line too long"),
        }
    }
}

/// A complete line, newline removed.
pub type Line = Vec<u8, MAX_LINE_LENGTH>;

/// Accumulates bytes into lines across calls.
///
/// Bytes beyond [`MAX_LINE_LENGTH`] put the buffer into a discarding state
/// that lasts until the next newline; that newline yields
/// [`MessageError::LineTooLong`] instead of a line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Line,
    discarding: bool,
}

impl LineBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
        }
    }

    /// Feed one byte. Returns the finished line when `byte` is a newline.
    pub fn push(&mut self, byte: u8) -> Option<Result<Line, MessageError>> {
        if byte == HANDSHAKE {
            let line = core::mem::take(&mut self.buf);
            if core::mem::take(&mut self.discarding) {
                return Some(Err(MessageError::LineTooLong));
            }
            return Some(Ok(line));
        }

        if !self.discarding && self.buf.push(byte).is_err() {
            self.buf.clear();
            self.discarding = true;
        }
        None
    }

    /// Drop any partial line.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    /// Bytes held for the current partial line.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty() && !self.discarding
    }
}
