//! Byte transport and clock capabilities.
//!
//! The controller owns exactly one [`Transport`] and one [`Clock`]. Both are
//! polled synchronously; nothing here blocks.

use core::fmt;

/// Error type for transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// UART/communication I/O error.
    Io,
    /// The transport cannot perform the request (e.g. runtime baud change).
    Unsupported,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "transport I/O error"),
            Self::Unsupported => write!(f, "operation not supported by transport"),
        }
    }
}

/// Byte-oriented duplex channel to the pad bridge.
///
/// This trait abstracts the UART so hardware, software-emulated and
/// in-memory channels can be used interchangeably.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait Transport {
    /// (Re)initialise the channel at `baud` bits per second.
    fn begin(&mut self, baud: u32) -> Result<(), TransportError>;

    /// `true` if at least one byte can be read without blocking.
    fn available(&mut self) -> bool;

    /// Read one byte without blocking, `None` if nothing is buffered.
    fn read(&mut self) -> Option<u8>;

    /// Queue one byte for transmission.
    fn write(&mut self, byte: u8) -> Result<(), TransportError>;

    /// Block until every queued byte has been sent.
    fn flush(&mut self) -> Result<(), TransportError>;

    /// Queue a run of bytes.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        bytes.iter().try_for_each(|&b| self.write(b))
    }

    /// Discard everything currently buffered on the receive side.
    ///
    /// Returns the number of bytes dropped.
    fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.read().is_some() {
            dropped += 1;
        }
        dropped
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn begin(&mut self, baud: u32) -> Result<(), TransportError> {
        (**self).begin(baud)
    }

    fn available(&mut self) -> bool {
        (**self).available()
    }

    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    fn write(&mut self, byte: u8) -> Result<(), TransportError> {
        (**self).write(byte)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }
}

/// Monotonic millisecond clock.
///
/// The counter is allowed to wrap; consumers compare with
/// `wrapping_sub` and signed differences.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch.
    fn now_ms(&self) -> u32;
}

impl<F: Fn() -> u32> Clock for F {
    fn now_ms(&self) -> u32 {
        self()
    }
}

/// Signed distance from `earlier` to `later`, correct across one wrap of the counter.
#[inline]
#[must_use]
pub const fn elapsed_ms(later: u32, earlier: u32) -> i32 {
    later.wrapping_sub(earlier) as i32
}

/// [`Transport`] over any blocking `embedded-io` UART that can report read readiness.
///
/// `begin` is a no-op returning [`TransportError::Unsupported`]: embedded-io has
/// no notion of baud rate, so the UART must be configured before wrapping.
#[cfg(feature = "embedded-io")]
pub struct IoTransport<U> {
    uart: U,
}

#[cfg(feature = "embedded-io")]
impl<U> IoTransport<U>
where
    U: embedded_io::Read + embedded_io::ReadReady + embedded_io::Write,
{
    /// Wrap a configured UART.
    #[must_use]
    pub fn new(uart: U) -> Self {
        Self { uart }
    }

    /// Get a mutable reference to the wrapped UART.
    pub fn inner_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Unwrap the UART.
    pub fn into_inner(self) -> U {
        self.uart
    }
}

#[cfg(feature = "embedded-io")]
impl<U> Transport for IoTransport<U>
where
    U: embedded_io::Read + embedded_io::ReadReady + embedded_io::Write,
{
    fn begin(&mut self, _baud: u32) -> Result<(), TransportError> {
        Err(TransportError::Unsupported)
    }

    fn available(&mut self) -> bool {
        self.uart.read_ready().unwrap_or(false)
    }

    fn read(&mut self) -> Option<u8> {
        if !self.available() {
            return None;
        }
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write(&mut self, byte: u8) -> Result<(), TransportError> {
        self.uart
            .write_all(&[byte])
            .map_err(|_| TransportError::Io)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.uart.write_all(bytes).map_err(|_| TransportError::Io)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.uart.flush().map_err(|_| TransportError::Io)
    }
}
