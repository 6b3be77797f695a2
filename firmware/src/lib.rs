//! PS2-over-UART receiver for RP2040.
//!
//! This crate wires the platform-agnostic [`ps2uart_core::Ps2Uart`]
//! controller to the RP2040: a buffered UART as transport, the embassy
//! time driver as clock and a USB HID gamepad as the output.

#![no_std]

// Re-export core types for convenience
pub use ps2uart_core::{
    Axis, Buttons, Clock, CommandError, Config, ControllerState, IoTransport, Ps2Uart, Sticks,
    Transport, TransportError, Vibrate,
};

pub mod clock;
pub mod usb_output;

pub use clock::EmbassyClock;
pub use usb_output::{configure_usb_hid, GamepadReport, UsbHidOutput};
