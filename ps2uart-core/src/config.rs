//! Controller configuration.

use crate::debounce::DEFAULT_DEBOUNCE_MS;

/// Default wait for a command reply line.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 500;

/// Default window for [`is_link_fresh`](crate::Ps2Uart::is_link_fresh).
pub const DEFAULT_RECENT_DATA_WINDOW_MS: u32 = 1_000;

/// Link rate used by [`begin`](crate::Ps2Uart::begin).
pub const DEFAULT_LINK_BAUD: u32 = 9_600;

/// Tunables for a [`Ps2Uart`](crate::Ps2Uart) instance.
///
/// # Example
///
/// ```
/// use ps2uart_core::Config;
///
/// let config = Config {
///     debounce_ms: 20,
///     ..Config::default()
/// };
/// assert_eq!(config.response_timeout_ms, 500);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Hold time before a raw button mask becomes stable.
    pub debounce_ms: u16,
    /// Reply timeout for the command helpers that do not take one explicitly.
    pub response_timeout_ms: u32,
    /// Freshness window for [`is_link_fresh`](crate::Ps2Uart::is_link_fresh).
    pub recent_data_window_ms: u32,
    /// Rate passed to [`Transport::begin`](crate::Transport::begin).
    pub link_baud: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            recent_data_window_ms: DEFAULT_RECENT_DATA_WINDOW_MS,
            link_baud: DEFAULT_LINK_BAUD,
        }
    }
}
