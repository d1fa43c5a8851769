use defmt::warn;
use embassy_rp::uart::{Async, UartRx, UartTx};
use livetune_core::{Transport, TransportError};

use crate::{feed, take, RxPipe};

/// UART link to the host console.
///
/// Writes go straight out through DMA. Reads come from an [`RxPipe`] filled
/// by [`uart_rx_task`].
///
/// # Pins
///
/// The firmware uses UART0 at 115200 baud:
/// - GPIO 0: TX
/// - GPIO 1: RX
pub struct UartTransport<'d> {
    tx: UartTx<'d, Async>,
    rx: &'static RxPipe,
}

impl<'d> UartTransport<'d> {
    /// Create a transport writing to `tx` and reading from `rx`.
    pub fn new(tx: UartTx<'d, Async>, rx: &'static RxPipe) -> Self {
        Self { tx, rx }
    }
}

impl<'d> Transport for UartTransport<'d> {
    async fn open(&mut self) -> Result<(), TransportError> {
        // A UART has no connection event; drop whatever arrived before boot.
        self.rx.clear();
        Ok(())
    }

    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        take(self.rx)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.tx.write(bytes).await.map_err(|_| TransportError::Io)
    }
}

/// RX task - moves bytes from the UART into `pipe`.
#[embassy_executor::task]
pub async fn uart_rx_task(mut rx: UartRx<'static, Async>, pipe: &'static RxPipe) {
    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => {
                if feed(pipe, &byte) > 0 {
                    warn!("RX pipe full, dropped {=u8:#x}", byte[0]);
                }
            }
            Err(e) => warn!("UART read error: {:?}", e),
        }
    }
}
