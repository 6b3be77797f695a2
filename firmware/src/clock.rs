//! Millisecond clock backed by the embassy time driver.

use embassy_time::Instant;
use ps2uart_core::Clock;

/// [`Clock`] reading [`Instant::now`], truncated to 32 bits.
///
/// The controller compares timestamps with wrapping arithmetic, so the
/// truncation only matters after ~49 days of uptime and is harmless then.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
