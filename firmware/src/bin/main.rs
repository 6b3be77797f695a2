#![no_std]
#![no_main]

use defmt::{debug, error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{UART1, USB};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig, Uart};
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig};
use ps2uart_rp2040::{
    configure_usb_hid, Buttons, Config, ControllerState, EmbassyClock, IoTransport, Ps2Uart,
    UsbHidOutput, Vibrate,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

type Pad = Ps2Uart<IoTransport<BufferedUart>, EmbassyClock>;

/// Poll cadence; must stay well below the debounce window.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Polls between link freshness checks (about one second).
const FRESHNESS_CHECK_EVERY: u32 = 200;

/// Latest controller state, or `None` once the link has gone quiet.
/// Signal gives "latest value wins" semantics, which is all a HID report needs.
static STATE_SIGNAL: StaticCell<Signal<CriticalSectionRawMutex, Option<ControllerState>>> =
    StaticCell::new();

/// UART ring buffers.
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("PS2-UART receiver starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let signal = STATE_SIGNAL.init(Signal::new());

    // --- UART Setup ---
    let config = Config::default();
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.link_baud;

    let tx_buf = TX_BUF.init([0; 64]);
    let rx_buf = RX_BUF.init([0; 256]);
    let uart = Uart::new_blocking(p.UART1, p.PIN_8, p.PIN_9, uart_config)
        .into_buffered(Irqs, tx_buf, rx_buf);

    let mut pad = Ps2Uart::with_config(IoTransport::new(uart), EmbassyClock, config);
    match pad.query_baud(config.response_timeout_ms) {
        Ok(baud) => info!("bridge reports {} baud", baud),
        Err(e) => warn!("bridge did not answer baud query: {:?}", e),
    }

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("Rust Gamepad");
    usb_config.product = Some("PS2-UART Gamepad");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    let hid_state = HID_STATE.init(State::new());
    let hid_writer = configure_usb_hid(&mut builder, hid_state);
    let usb_device = builder.build();
    let usb_output = UsbHidOutput::new(hid_writer);

    // On-board LED mirrors link state
    let led = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(pad_task(pad, signal, led).unwrap());
    spawner.spawn(output_task(usb_output, signal).unwrap());

    info!("PS2-UART receiver initialized, waiting for frames...");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// Controller task - polls the link and publishes the decoded state.
#[embassy_executor::task]
async fn pad_task(
    mut pad: Pad,
    signal: &'static Signal<CriticalSectionRawMutex, Option<ControllerState>>,
    mut led: Output<'static>,
) {
    let mut ticker = Ticker::every(POLL_INTERVAL);
    let mut polls: u32 = 0;
    let mut link_up = false;

    loop {
        ticker.next().await;

        if pad.update().is_some() {
            signal.signal(Some(pad.state()));
        }

        if pad.button_pressed(Buttons::START) {
            debug!("START pressed, pulsing motors");
            if let Err(e) = pad.send_vibrate(Vibrate::Both) {
                error!("vibrate failed: {:?}", e);
            }
        }
        if pad.button_released(Buttons::START) {
            debug!("START released");
        }

        polls = polls.wrapping_add(1);
        if polls % FRESHNESS_CHECK_EVERY != 0 {
            continue;
        }

        let fresh = pad.is_link_fresh();
        if fresh != link_up {
            link_up = fresh;
            led.set_level(if fresh { Level::High } else { Level::Low });
            if fresh {
                info!("link up");
            } else {
                warn!("link quiet, releasing all inputs");
                signal.signal(None);
            }
        }
    }
}

/// Output task - waits for state signals and sends them to USB HID.
#[embassy_executor::task]
async fn output_task(
    mut output: UsbHidOutput<'static>,
    signal: &'static Signal<CriticalSectionRawMutex, Option<ControllerState>>,
) {
    output.wait_ready().await;
    info!("USB HID ready, forwarding controller state...");

    loop {
        let result = match signal.wait().await {
            Some(state) => output.send(&state).await,
            None => output.send_neutral().await,
        };
        if let Err(e) = result {
            error!("HID write failed: {:?}", e);
        }
    }
}
