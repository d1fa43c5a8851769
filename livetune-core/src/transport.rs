//! Transport trait and error types.

use core::future::Future;

/// Error type for transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// UART/USB/communication I/O error.
    Io,
    /// Link not ready (e.g., USB not enumerated yet).
    NotReady,
    /// The peer went away (e.g., USB cable pulled).
    Disconnected,
    /// This transport backend is not available on this target.
    Unsupported,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "i/o error"),
            Self::NotReady => write!(f, "transport not ready"),
            Self::Disconnected => write!(f, "peer disconnected"),
            Self::Unsupported => write!(f, "transport not supported"),
        }
    }
}

/// Byte-stream link between the device and the host console.
///
/// Reads are non-blocking polls so a step never waits on the host; writes
/// are async and may wait for the previous transfer to drain.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait Transport {
    /// Wait until the link can carry data and discard any stale input.
    ///
    /// Called once by [`Dashboard::connect`](crate::Dashboard::connect).
    fn open(&mut self) -> impl Future<Output = Result<(), TransportError>>;

    /// Number of received bytes ready to be read.
    fn available(&mut self) -> usize;

    /// Take the next received byte, or `None` if nothing is pending.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> impl Future<Output = Result<(), TransportError>>;

    /// Write `text` followed by a newline.
    fn write_line(&mut self, text: &str) -> impl Future<Output = Result<(), TransportError>> {
        async move {
            self.write(text.as_bytes()).await?;
            self.write(b"\n").await
        }
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn open(&mut self) -> impl Future<Output = Result<(), TransportError>> {
        (**self).open()
    }

    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> impl Future<Output = Result<(), TransportError>> {
        (**self).write(bytes)
    }

    fn write_line(&mut self, text: &str) -> impl Future<Output = Result<(), TransportError>> {
        (**self).write_line(text)
    }
}

/// Placeholder for backends that do not exist on this target yet
/// (e.g. a network socket on a board without a network stack).
///
/// Never has input; every open and write fails with
/// [`TransportError::Unsupported`].
pub struct NullTransport;

impl Transport for NullTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        Err(TransportError::Unsupported)
    }

    fn available(&mut self) -> usize {
        0
    }

    fn read_byte(&mut self) -> Option<u8> {
        None
    }

    async fn write(&mut self, _bytes: &[u8]) -> Result<(), TransportError> {
        Err(TransportError::Unsupported)
    }
}
