//! Raw-to-stable button debouncing.

use log::trace;
use ps2uart_proto::Buttons;

use crate::transport::elapsed_ms;

/// Default confirmation window.
pub const DEFAULT_DEBOUNCE_MS: u16 = 30;

/// A promoted stable value together with the one it replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub previous: Buttons,
    pub current: Buttons,
}

/// Time-based debounce filter.
///
/// A raw mask becomes stable once it has been observed unchanged for at
/// least the configured window. Any change restarts the window. Promotion
/// only happens when a sample arrives, so a value is confirmed by the first
/// frame carrying it after the window has elapsed.
#[derive(Clone, Debug)]
pub struct Debouncer {
    raw: Buttons,
    stable: Buttons,
    last: Buttons,
    window_start_ms: u32,
    debounce_ms: u16,
}

impl Debouncer {
    #[must_use]
    pub const fn new(debounce_ms: u16) -> Self {
        Self {
            raw: Buttons::NONE,
            stable: Buttons::NONE,
            last: Buttons::NONE,
            window_start_ms: 0,
            debounce_ms,
        }
    }

    /// Feed the mask decoded from a frame received at `now_ms`.
    ///
    /// Returns the transition when the stable value changes.
    pub fn sample(&mut self, raw: Buttons, now_ms: u32) -> Option<Transition> {
        if raw != self.raw {
            self.raw = raw;
            self.window_start_ms = now_ms;
            return None;
        }

        if elapsed_ms(now_ms, self.window_start_ms) < i32::from(self.debounce_ms) {
            return None;
        }
        if raw == self.stable {
            return None;
        }

        self.last = self.stable;
        self.stable = raw;
        trace!("stable buttons {:#06x} -> {:#06x}", self.last.raw(), raw.raw());
        Some(Transition {
            previous: self.last,
            current: raw,
        })
    }

    /// Most recently sampled mask.
    #[inline]
    #[must_use]
    pub const fn raw(&self) -> Buttons {
        self.raw
    }

    /// Debounced mask.
    #[inline]
    #[must_use]
    pub const fn stable(&self) -> Buttons {
        self.stable
    }

    /// Stable mask before the most recent promotion.
    #[inline]
    #[must_use]
    pub const fn last(&self) -> Buttons {
        self.last
    }

    #[inline]
    #[must_use]
    pub const fn debounce_ms(&self) -> u16 {
        self.debounce_ms
    }

    /// Change the window. Takes effect on the next sample.
    pub fn set_debounce_ms(&mut self, ms: u16) {
        self.debounce_ms = ms;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}
