//! Live-tunable controls and reporters for RP2040.
//!
//! This crate provides the embassy implementations of the
//! [`livetune_core`] platform traits: a monotonic [`EmbassyClock`] and two
//! byte-stream transports, UART0 ([`UartTransport`]) and USB CDC-ACM
//! ([`UsbSerialTransport`]). Received bytes are moved into an [`RxPipe`] by
//! a background task so that [`Transport::available`] and
//! [`Transport::read_byte`] never wait.

#![no_std]

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;

// Re-export core types for convenience
pub use livetune_core::{
    Clock, CommManager, Config, ControlId, Dashboard, Headroom, LinkError, LinkStats, RegisterError,
    ReporterId, SessionState, Transport, TransportError,
};

pub mod clock;
pub mod uart;
pub mod usb_serial;

pub use clock::EmbassyClock;
pub use uart::{uart_rx_task, UartTransport};
pub use usb_serial::{usb_config, usb_rx_task, usb_task, UsbSerialTransport};

/// Bytes received from the host that the link has not read yet.
pub const RX_PIPE_SIZE: usize = 256;

/// Hand-off between an RX task and its transport.
pub type RxPipe = Pipe<CriticalSectionRawMutex, RX_PIPE_SIZE>;

/// Push received bytes into `pipe`, dropping whatever does not fit.
///
/// Returns the number of bytes dropped.
fn feed(pipe: &RxPipe, bytes: &[u8]) -> usize {
    let written = pipe.try_write(bytes).unwrap_or(0);
    bytes.len() - written
}

/// Pop one byte from `pipe` if any is pending.
fn take(pipe: &RxPipe) -> Option<u8> {
    let mut byte = [0u8; 1];
    match pipe.try_read(&mut byte) {
        Ok(1) => Some(byte[0]),
        _ => None,
    }
}
