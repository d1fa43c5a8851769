//! USB CDC-ACM (virtual serial port) link to the host console.

use defmt::{info, warn};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::cdc_acm::{Receiver, Sender};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Config as UsbConfig, UsbDevice};
use livetune_core::{Transport, TransportError};

use crate::{feed, take, RxPipe};

/// The RP2040 USB driver used by every type in this module.
pub type UsbDriver = Driver<'static, USB>;

/// Full-speed bulk packet size used for the CDC data endpoints.
pub const MAX_PACKET_SIZE: u16 = 64;

/// USB device configuration for a CDC-ACM serial port.
pub fn usb_config(serial: &'static str) -> UsbConfig<'static> {
    let mut config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    config.manufacturer = Some("livetune");
    config.product = Some("livetune console");
    config.serial_number = Some(serial);
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    // Required for windows compatibility.
    config.device_class = 0xEF;
    config.device_sub_class = 0x02;
    config.device_protocol = 0x01;
    config.composite_with_iads = true;

    config
}

/// Host link over the CDC-ACM data endpoints.
///
/// Writes are split into packets on the IN endpoint. Reads come from an
/// [`RxPipe`] filled by [`usb_rx_task`].
pub struct UsbSerialTransport {
    tx: Sender<'static, UsbDriver>,
    rx: &'static RxPipe,
}

impl UsbSerialTransport {
    pub fn new(tx: Sender<'static, UsbDriver>, rx: &'static RxPipe) -> Self {
        Self { tx, rx }
    }
}

impl Transport for UsbSerialTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        self.tx.wait_connection().await;
        self.rx.clear();
        info!("USB serial connected");
        Ok(())
    }

    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        take(self.rx)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let size = usize::from(self.tx.max_packet_size());
        for packet in bytes.chunks(size) {
            self.tx.write_packet(packet).await.map_err(transport_error)?;
        }
        // A full last packet needs a zero-length packet to end the transfer.
        if !bytes.is_empty() && bytes.len() % size == 0 {
            self.tx.write_packet(&[]).await.map_err(transport_error)?;
        }
        Ok(())
    }
}

fn transport_error(e: EndpointError) -> TransportError {
    match e {
        EndpointError::Disabled => TransportError::Disconnected,
        EndpointError::BufferOverflow => TransportError::Io,
    }
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
pub async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

/// RX task - moves packets from the OUT endpoint into `pipe`.
#[embassy_executor::task]
pub async fn usb_rx_task(mut rx: Receiver<'static, UsbDriver>, pipe: &'static RxPipe) {
    let mut packet = [0u8; MAX_PACKET_SIZE as usize];
    loop {
        rx.wait_connection().await;
        loop {
            match rx.read_packet(&mut packet).await {
                Ok(len) => {
                    let dropped = feed(pipe, &packet[..len]);
                    if dropped > 0 {
                        warn!("RX pipe full, dropped {=usize} bytes", dropped);
                    }
                }
                Err(EndpointError::Disabled) => {
                    info!("USB serial disconnected");
                    break;
                }
                Err(EndpointError::BufferOverflow) => warn!("USB packet overflow"),
            }
        }
    }
}
