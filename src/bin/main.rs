#![no_std]
#![no_main]

use core::cell::Cell;
use core::fmt::Write as _;
use core::time::Duration;

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_time::Timer;
use livetune::{Config, Dashboard, EmbassyClock, RegisterError, RxPipe, SessionState, Transport};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

#[cfg(all(feature = "transport-uart", feature = "transport-usb"))]
compile_error!("enable only one of the `transport-uart` and `transport-usb` features");
#[cfg(not(any(feature = "transport-uart", feature = "transport-usb")))]
compile_error!("enable one of the `transport-uart` or `transport-usb` features");

#[cfg(feature = "transport-uart")]
bind_interrupts!(struct Irqs {
    UART0_IRQ => embassy_rp::uart::InterruptHandler<embassy_rp::peripherals::UART0>;
});

#[cfg(feature = "transport-usb")]
bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<embassy_rp::peripherals::USB>;
});

/// Bytes from the host waiting to be read by the link.
static RX_PIPE: RxPipe = RxPipe::new();

/// How often the demo loop logs link statistics.
const STATS_INTERVAL: u32 = 250;

#[cfg(feature = "transport-uart")]
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    use embassy_rp::uart::{Config as UartConfig, Uart};
    use livetune::{uart_rx_task, UartTransport};

    info!("livetune starting (UART)...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = 115_200;

    let uart = Uart::new(
        p.UART0,
        p.PIN_0, // TX
        p.PIN_1, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();

    spawner.spawn(uart_rx_task(rx, &RX_PIPE)).unwrap();

    run(UartTransport::new(tx, &RX_PIPE)).await
}

#[cfg(feature = "transport-usb")]
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    use embassy_rp::usb::Driver;
    use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
    use embassy_usb::Builder;
    use livetune::usb_serial::MAX_PACKET_SIZE;
    use livetune::{usb_config, usb_rx_task, usb_task, UsbSerialTransport};
    use static_cell::StaticCell;

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static CDC_STATE: StaticCell<State> = StaticCell::new();

    info!("livetune starting (USB)...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let usb_driver = Driver::new(p.USB, Irqs);
    let mut builder = Builder::new(
        usb_driver,
        usb_config("001"),
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 256]),
        CONTROL_BUF.init([0; 64]),
    );

    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), MAX_PACKET_SIZE);
    let (tx, rx) = class.split();
    let usb_device = builder.build();

    spawner.spawn(usb_task(usb_device)).unwrap();
    spawner.spawn(usb_rx_task(rx, &RX_PIPE)).unwrap();

    run(UsbSerialTransport::new(tx, &RX_PIPE)).await
}

/// Values tuned and watched from the console.
struct Tunables {
    enable: Cell<bool>,
    beep: Cell<bool>,
    target: Cell<f32>,
    gain: Cell<f32>,
    stick_x: Cell<f32>,
    stick_y: Cell<f32>,
    speed: Cell<f32>,
    ticks: Cell<i32>,
    trace: [Cell<f32>; 2],
}

impl Tunables {
    fn new() -> Self {
        Self {
            enable: Cell::new(false),
            beep: Cell::new(false),
            target: Cell::new(0.0),
            gain: Cell::new(0.1),
            stick_x: Cell::new(0.0),
            stick_y: Cell::new(0.0),
            speed: Cell::new(0.0),
            ticks: Cell::new(0),
            trace: [Cell::new(0.0), Cell::new(0.0)],
        }
    }

    fn register<'a>(&'a self, dash: &mut Dashboard<'a>) -> Result<(), RegisterError> {
        dash.add_toggle(&self.enable, "Enable")?;
        dash.add_button(&self.beep, "Beep")?;
        dash.add_slider(&self.target, "Target", -100.0..=100.0, 0.5, false)?;
        dash.add_slider(&self.gain, "Gain", 0.0..=1.0, 0.01, true)?;
        dash.add_joystick(
            &self.stick_x,
            &self.stick_y,
            "Nudge",
            -1.0..=1.0,
            -1.0..=1.0,
            0.05,
            false,
        )?;
        dash.add_number(&self.speed, "Speed")?;
        dash.add_number(&self.ticks, "Ticks")?;
        dash.add_plot(&self.trace, "Speed vs target", -100.0..=100.0, 200)?;
        Ok(())
    }

    /// One step of a first-order speed controller.
    fn update(&self) {
        if self.enable.get() {
            let error = self.target.get() + self.stick_x.get() * 10.0 - self.speed.get();
            self.speed
                .set(self.speed.get() + self.gain.get() * error + self.stick_y.get());
            self.ticks.set(self.ticks.get().wrapping_add(1));
        } else {
            self.speed.set(0.0);
        }
        self.trace[0].set(self.speed.get());
        self.trace[1].set(self.target.get());
    }
}

/// Register the demo values, open the link and drive it forever.
async fn run<T: Transport>(transport: T) -> ! {
    let app = Tunables::new();
    let mut dash = Dashboard::new(Config::new(
        Duration::from_millis(20),
        Duration::from_millis(100),
    ));
    if let Err(e) = app.register(&mut dash) {
        error!("Registration failed: {:?}", e);
    }
    info!("Schema: {=str}", dash.schema());

    let mut link = match dash.connect(transport, EmbassyClock::new()).await {
        Ok(link) => link,
        Err(e) => {
            error!("Transport failed to open: {:?}", e);
            loop {
                Timer::after_secs(60).await;
            }
        }
    };

    info!("Link up, waiting for the console...");

    let mut was_pressed = false;
    let mut iteration = 0u32;
    loop {
        if let Err(e) = link.step().await {
            warn!("Link error: {:?}", e);
        }

        let pressed = app.beep.get();
        if pressed && !was_pressed && link.state() == SessionState::Active {
            let mut text = heapless::String::<48>::new();
            let _ = write!(text, "beep at tick {}", app.ticks.get());
            if let Err(e) = link.debug(&text).await {
                warn!("Debug frame failed: {:?}", e);
            }
        }
        was_pressed = pressed;

        app.update();

        iteration = iteration.wrapping_add(1);
        if iteration % STATS_INTERVAL == 0 {
            let stats = link.stats();
            info!(
                "headroom {=i64} us, {=u32} overruns, {=u32} updates, {=u32} rejected",
                link.headroom().as_micros(),
                stats.overruns,
                stats.updates,
                stats.rejected
            );
        }
    }
}
