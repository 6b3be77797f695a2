//! USB HID gamepad output.

use defmt::Format;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::Builder;
use ps2uart_core::{ControllerState, Sticks};

/// USB HID gamepad report.
///
/// Matches [`REPORT_DESCRIPTOR`]. Total size: 6 bytes (buttons: 2, sticks: 4x1).
/// Axes are forwarded unscaled; the PS2 pad already reports 0-255.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Format)]
#[repr(C)]
pub struct GamepadReport {
    /// Button bitfield in PS2 bit order
    pub buttons: u16,
    pub left_stick_x: u8,
    pub left_stick_y: u8,
    pub right_stick_x: u8,
    pub right_stick_y: u8,
}

impl GamepadReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 6;

    /// Convert the report to bytes.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let buttons_bytes = self.buttons.to_le_bytes();
        [
            buttons_bytes[0],
            buttons_bytes[1],
            self.left_stick_x,
            self.left_stick_y,
            self.right_stick_x,
            self.right_stick_y,
        ]
    }

    /// No buttons, sticks centred.
    #[must_use]
    pub const fn neutral() -> Self {
        Self::from_parts(0, Sticks::NEUTRAL)
    }

    const fn from_parts(buttons: u16, sticks: Sticks) -> Self {
        Self {
            buttons,
            left_stick_x: sticks.left_x,
            left_stick_y: sticks.left_y,
            right_stick_x: sticks.right_x,
            right_stick_y: sticks.right_y,
        }
    }
}

impl From<&ControllerState> for GamepadReport {
    fn from(state: &ControllerState) -> Self {
        Self::from_parts(state.buttons.raw(), state.sticks)
    }
}

/// HID gamepad with 16 buttons and two 8-bit sticks.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (16 buttons) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x95, 0x10, //   Report Count (16)
    0x75, 0x01, //   Report Size (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Sticks: X, Y, Z, Rz ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x95, 0x04, //   Report Count (4)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

type UsbDriver<'d> = Driver<'d, USB>;

/// USB HID gamepad output.
///
/// Wraps an embassy-usb HID writer and skips reports identical to the last one sent.
pub struct UsbHidOutput<'d> {
    writer: HidWriter<'d, UsbDriver<'d>, { GamepadReport::SIZE }>,
    last: Option<GamepadReport>,
}

impl<'d> UsbHidOutput<'d> {
    pub fn new(writer: HidWriter<'d, UsbDriver<'d>, { GamepadReport::SIZE }>) -> Self {
        Self { writer, last: None }
    }

    /// Wait until the device is ready (USB enumerated).
    pub async fn wait_ready(&mut self) {
        self.writer.ready().await;
    }

    /// Send the report for `state` unless it matches the previous one.
    pub async fn send(&mut self, state: &ControllerState) -> Result<(), EndpointError> {
        self.send_report(GamepadReport::from(state)).await
    }

    /// Send a neutral report, e.g. when the link has gone quiet.
    pub async fn send_neutral(&mut self) -> Result<(), EndpointError> {
        self.send_report(GamepadReport::neutral()).await
    }

    async fn send_report(&mut self, report: GamepadReport) -> Result<(), EndpointError> {
        if self.last == Some(report) {
            return Ok(());
        }
        self.writer.write(&report.as_bytes()).await?;
        self.last = Some(report);
        Ok(())
    }
}

/// Configure the USB HID class in the USB builder.
///
/// Returns the HID writer for use by the application.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, UsbDriver<'d>>,
    state: &'d mut State<'d>,
) -> HidWriter<'d, UsbDriver<'d>, { GamepadReport::SIZE }> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: 1,
        max_packet_size: 8,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}
