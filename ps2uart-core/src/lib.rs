//! Polled PS2 controller receiver for a UART-attached pad bridge.
//!
//! A bridge MCU reads a PlayStation 2 pad and streams its state over a
//! serial link. This crate owns the host side of that link: it reassembles
//! frames, debounces buttons, tracks edge events and talks the bridge's
//! small command protocol. It has no platform dependencies and runs in
//! `no_std` environments as well as on the host for testing.
//!
//! # Overview
//!
//! - [`transport`]: byte channel and clock capabilities ([`Transport`], [`Clock`])
//! - [`debounce`]: raw-to-stable button filtering ([`Debouncer`])
//! - [`events`]: one-shot press/release/change accumulators ([`EdgeTracker`])
//! - [`controller`]: the polled receiver ([`Ps2Uart`])
//! - [`command`]: vibration and AT commands ([`CommandError`])
//! - [`config`]: tunables ([`Config`])
//!
//! Wire-level types live in [`ps2uart_proto`] and are re-exported here.
//!
//! # Usage
//!
//! ```ignore
//! let mut pad = Ps2Uart::new(IoTransport::new(uart), clock);
//!
//! loop {
//!     pad.update();
//!
//!     if pad.button_pressed(Buttons::START) {
//!         pad.send_vibrate(Vibrate::Both)?;
//!     }
//!     let throttle = pad.analog(Axis::LeftY);
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`embedded-io`**: [`IoTransport`] adapter for `embedded-io` UARTs

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod command;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod events;
pub mod transport;

#[cfg(test)]
mod testutil;

// Re-export main types at crate root
pub use command::CommandError;
pub use config::{
    Config, DEFAULT_LINK_BAUD, DEFAULT_RECENT_DATA_WINDOW_MS, DEFAULT_RESPONSE_TIMEOUT_MS,
};
pub use controller::{ControllerState, Ps2Uart};
pub use debounce::{Debouncer, Transition, DEFAULT_DEBOUNCE_MS};
pub use events::EdgeTracker;
#[cfg(feature = "embedded-io")]
pub use transport::IoTransport;
pub use transport::{elapsed_ms, Clock, Transport, TransportError};

pub use ps2uart_proto::{Axis, BaudRate, Buttons, PadReport, Sticks, Vibrate};
