//! The polled PS2-over-UART controller.

use log::debug;
use ps2uart_proto::{
    decode, Axis, Buttons, FrameAssembler, PadReport, Sticks, DISCONNECT_BYTE, START_BYTE,
};

use crate::config::Config;
use crate::debounce::Debouncer;
use crate::events::EdgeTracker;
use crate::transport::{Clock, Transport, TransportError};

/// Snapshot of the decoded pad state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerState {
    /// Mask from the most recent frame, undebounced.
    pub raw_buttons: Buttons,
    /// Debounced mask.
    pub buttons: Buttons,
    /// Debounced mask before the latest stable change.
    pub last_buttons: Buttons,
    /// Axes from the most recent frame.
    pub sticks: Sticks,
}

/// PS2 pad receiver over a UART link.
///
/// Owns the transport, the framer, the debounce filter and the edge
/// accumulators. Call [`update`](Self::update) from the main loop at least
/// once per debounce window; everything happens synchronously inside that
/// call and the query methods.
///
/// Instances are not meant to be shared between execution contexts. Wrap
/// the whole controller in a mutex if it must be reached from more than one.
///
/// # Example
///
/// ```
/// use ps2uart_core::{Buttons, Ps2Uart, Transport, TransportError};
///
/// struct Loopback(Vec<u8>);
///
/// impl Transport for Loopback {
///     fn begin(&mut self, _baud: u32) -> Result<(), TransportError> { Ok(()) }
///     fn available(&mut self) -> bool { !self.0.is_empty() }
///     fn read(&mut self) -> Option<u8> {
///         if self.0.is_empty() { None } else { Some(self.0.remove(0)) }
///     }
///     fn write(&mut self, _byte: u8) -> Result<(), TransportError> { Ok(()) }
///     fn flush(&mut self) -> Result<(), TransportError> { Ok(()) }
/// }
///
/// let frame = [0x0D, 0x00, 0x10, 0x7F, 0x80, 0x7F, 0x80, 0x0A];
/// let mut wire = frame.to_vec();
/// wire.extend_from_slice(&frame);
///
/// let now = std::cell::Cell::new(0u32);
/// let mut pad = Ps2Uart::new(Loopback(wire), || now.get());
///
/// pad.update();
/// now.set(40);
/// pad.update();
///
/// assert!(pad.button_pressed(Buttons::PAD_UP));
/// assert!(!pad.button_pressed(Buttons::PAD_UP));
/// ```
pub struct Ps2Uart<T, C> {
    pub(crate) transport: Option<T>,
    pub(crate) clock: C,
    pub(crate) config: Config,
    pub(crate) framer: FrameAssembler,
    debouncer: Debouncer,
    edges: EdgeTracker,
    sticks: Sticks,
    last_receive_ms: Option<u32>,
}

impl<T: Transport, C: Clock> Ps2Uart<T, C> {
    /// Create a controller with the default [`Config`].
    pub fn new(transport: T, clock: C) -> Self {
        Self::with_config(transport, clock, Config::default())
    }

    /// Create a controller with explicit tunables.
    pub fn with_config(transport: T, clock: C, config: Config) -> Self {
        Self::build(Some(transport), clock, config)
    }

    /// Create a controller without a transport.
    ///
    /// Every query returns its neutral value and every command fails with
    /// [`CommandError::NoTransport`](crate::CommandError::NoTransport).
    pub fn detached(clock: C) -> Self {
        Self::build(None, clock, Config::default())
    }

    fn build(transport: Option<T>, clock: C, config: Config) -> Self {
        Self {
            transport,
            clock,
            config,
            framer: FrameAssembler::new(),
            debouncer: Debouncer::new(config.debounce_ms),
            edges: EdgeTracker::new(),
            sticks: Sticks::NEUTRAL,
            last_receive_ms: None,
        }
    }

    /// Initialise the transport at the configured link rate.
    pub fn begin(&mut self) -> Result<(), TransportError> {
        self.begin_with(self.config.link_baud)
    }

    /// Initialise the transport at `baud`. No-op without a transport.
    pub fn begin_with(&mut self, baud: u32) -> Result<(), TransportError> {
        match self.transport.as_mut() {
            Some(transport) => transport.begin(baud),
            None => Ok(()),
        }
    }

    /// Poll the transport and process at most one frame.
    ///
    /// Returns the decoded report when a frame completed during this call.
    /// Bytes after that frame stay buffered in the transport for the next call.
    pub fn update(&mut self) -> Option<PadReport> {
        let now = self.clock.now_ms();
        self.pump(now);

        let frame = self.framer.take_frame()?;
        let report = decode(&frame);
        self.sticks = report.sticks;
        if let Some(transition) = self.debouncer.sample(report.buttons, now) {
            self.edges.record(transition, now);
        }
        self.last_receive_ms = Some(now);
        Some(report)
    }

    fn pump(&mut self, now: u32) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };

        self.framer.apply_pending_start();
        while !self.framer.is_ready() && transport.available() {
            let Some(byte) = transport.read() else {
                break;
            };
            self.last_receive_ms = Some(now);
            self.framer.push(byte);
        }
    }

    /// Drain pending input looking for link sentinels.
    ///
    /// A disconnect byte marks the link down. A start byte marks it up and
    /// is handed to the next [`update`](Self::update) so the frame it opens is
    /// not lost. Any other byte is discarded, along with a frame in progress.
    ///
    /// For a check that does not consume input use
    /// [`has_recent_data`](Self::has_recent_data).
    pub fn is_remote_connected(&mut self) -> bool {
        let Some(transport) = self.transport.as_mut() else {
            return false;
        };

        let now = self.clock.now_ms();
        while let Some(byte) = transport.read() {
            self.last_receive_ms = Some(now);
            match byte {
                DISCONNECT_BYTE => self.framer.disconnect(),
                START_BYTE => {
                    self.framer.note_start();
                    break;
                }
                _ => self.framer.abort_partial(),
            }
        }

        if !self.framer.is_connected() {
            debug!("remote reports no controller");
        }
        self.framer.is_connected()
    }

    /// `true` if any byte arrived within the last `window_ms` milliseconds.
    #[must_use]
    pub fn has_recent_data(&self, window_ms: u32) -> bool {
        self.last_receive_ms
            .is_some_and(|at| self.clock.now_ms().wrapping_sub(at) <= window_ms)
    }

    /// [`has_recent_data`](Self::has_recent_data) over the configured window.
    #[must_use]
    pub fn is_link_fresh(&self) -> bool {
        self.has_recent_data(self.config.recent_data_window_ms)
    }

    /// Debounced button mask.
    #[inline]
    #[must_use]
    pub fn buttons(&self) -> Buttons {
        self.debouncer.stable()
    }

    /// Mask from the most recent frame, undebounced.
    #[inline]
    #[must_use]
    pub fn raw_buttons(&self) -> Buttons {
        self.debouncer.raw()
    }

    /// Level query: is any button in `mask` held (debounced)?
    #[inline]
    #[must_use]
    pub fn button(&self, mask: Buttons) -> bool {
        self.debouncer.stable().intersects(mask)
    }

    /// Edge query: was any button in `mask` pressed since the last such query?
    ///
    /// Clears the reported bits.
    pub fn button_pressed(&mut self, mask: Buttons) -> bool {
        self.edges.take_pressed(mask)
    }

    /// Edge query: was any button in `mask` released since the last such query?
    ///
    /// Clears the reported bits.
    pub fn button_released(&mut self, mask: Buttons) -> bool {
        self.edges.take_released(mask)
    }

    /// Edge query: did any button in `mask` change either way?
    ///
    /// Clears the reported bits. Independent of the press/release queries.
    pub fn button_changed(&mut self, mask: Buttons) -> bool {
        self.edges.take_changed(mask)
    }

    /// Milliseconds the lowest button in `mask` has been held, `None` if released.
    #[must_use]
    pub fn held_for(&self, mask: Buttons) -> Option<u32> {
        let since = self.edges.hold_start_ms(mask)?;
        Some(self.clock.now_ms().wrapping_sub(since))
    }

    /// Analog axis value, 0-255.
    #[inline]
    #[must_use]
    pub fn analog(&self, axis: Axis) -> u8 {
        self.sticks.axis(axis)
    }

    /// Analog axis by PS2X code (`PSS_RX = 5` .. `PSS_LY = 8`); 0 for unknown codes.
    #[must_use]
    pub fn analog_code(&self, code: u8) -> u8 {
        Axis::from_code(code).map_or(0, |axis| self.analog(axis))
    }

    /// Both sticks from the most recent frame.
    #[inline]
    #[must_use]
    pub fn sticks(&self) -> Sticks {
        self.sticks
    }

    /// Full decoded state.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        ControllerState {
            raw_buttons: self.debouncer.raw(),
            buttons: self.debouncer.stable(),
            last_buttons: self.debouncer.last(),
            sticks: self.sticks,
        }
    }

    #[inline]
    #[must_use]
    pub fn debounce_ms(&self) -> u16 {
        self.debouncer.debounce_ms()
    }

    pub fn set_debounce_ms(&mut self, ms: u16) {
        self.config.debounce_ms = ms;
        self.debouncer.set_debounce_ms(ms);
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a mutable reference to the transport, if any.
    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    /// Decompose the controller, handing back the transport.
    pub fn release(self) -> Option<T> {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testutil::{ScriptedTransport, TestClock};
    use std::vec::Vec;

    const UP_FRAME: [u8; 8] = [0x0D, 0x00, 0x10, 0x7F, 0x80, 0x7F, 0x80, 0x0A];
    const IDLE_FRAME: [u8; 8] = [0x0D, 0x00, 0x00, 0x7F, 0x80, 0x7F, 0x80, 0x0A];

    fn pad() -> (Ps2Uart<ScriptedTransport, TestClock>, ScriptedTransport, TestClock) {
        let link = ScriptedTransport::new();
        let clock = TestClock::new();
        (Ps2Uart::new(link.clone(), clock.clone()), link, clock)
    }

    #[test]
    fn test_pad_up_scenario() {
        let (mut pad, link, clock) = pad();

        link.feed(&UP_FRAME);
        let report = pad.update().unwrap();
        assert_eq!(report.buttons, Buttons::PAD_UP);
        assert_eq!(pad.raw_buttons(), Buttons::PAD_UP);
        assert_eq!(pad.buttons(), Buttons::NONE);
        assert_eq!(pad.analog(Axis::LeftY), 0x7F);
        assert_eq!(pad.analog(Axis::LeftX), 0x80);
        assert_eq!(pad.analog(Axis::RightY), 0x7F);
        assert_eq!(pad.analog(Axis::RightX), 0x80);

        clock.advance(30);
        link.feed(&UP_FRAME);
        pad.update().unwrap();
        assert_eq!(pad.buttons(), Buttons::PAD_UP);
        assert!(pad.button(Buttons::PAD_UP));
        assert!(pad.button_pressed(Buttons::PAD_UP));
        assert!(!pad.button_pressed(Buttons::PAD_UP));
    }

    #[test]
    fn test_one_frame_per_update() {
        let (mut pad, link, _clock) = pad();
        link.feed(&UP_FRAME);
        link.feed(&IDLE_FRAME);

        assert_eq!(pad.update().map(|r| r.buttons), Some(Buttons::PAD_UP));
        assert_eq!(link.pending(), IDLE_FRAME.len());
        assert_eq!(pad.update().map(|r| r.buttons), Some(Buttons::NONE));
        assert_eq!(pad.update(), None);
    }

    #[test]
    fn test_frame_spanning_updates() {
        let (mut pad, link, _clock) = pad();
        link.feed(&UP_FRAME[..4]);
        assert_eq!(pad.update(), None);
        link.feed(&UP_FRAME[4..]);
        assert!(pad.update().is_some());
    }

    #[test]
    fn test_glitch_shorter_than_window_is_filtered() {
        let (mut pad, link, clock) = pad();
        link.feed(&UP_FRAME);
        pad.update();
        clock.advance(10);
        link.feed(&IDLE_FRAME);
        pad.update();
        clock.advance(100);
        link.feed(&IDLE_FRAME);
        pad.update();

        assert_eq!(pad.buttons(), Buttons::NONE);
        assert!(!pad.button_pressed(Buttons::PAD_UP));
    }

    #[test]
    fn test_press_then_release() {
        let (mut pad, link, clock) = pad();
        for frame in [UP_FRAME, UP_FRAME, IDLE_FRAME, IDLE_FRAME] {
            link.feed(&frame);
            pad.update();
            clock.advance(30);
        }
        assert!(pad.button_pressed(Buttons::PAD_UP));
        assert!(pad.button_released(Buttons::PAD_UP));
        assert!(!pad.button_released(Buttons::PAD_UP));
        assert!(pad.button_changed(Buttons::PAD_UP));
        assert_eq!(pad.state().last_buttons, Buttons::PAD_UP);
    }

    #[test]
    fn test_held_for() {
        let (mut pad, link, clock) = pad();
        link.feed(&UP_FRAME);
        pad.update();
        clock.advance(30);
        link.feed(&UP_FRAME);
        pad.update();
        assert_eq!(pad.held_for(Buttons::PAD_UP), Some(0));
        clock.advance(250);
        assert_eq!(pad.held_for(Buttons::PAD_UP), Some(250));
        assert_eq!(pad.held_for(Buttons::START), None);
    }

    #[test]
    fn test_disconnect_mid_frame_then_clean_frame() {
        let (mut pad, link, _clock) = pad();
        link.feed(&[0x0D, 0x00, 0x10, 0xAB, 0x01, 0x02, 0x0A, 0x99]);
        link.feed(&IDLE_FRAME);

        assert_eq!(pad.update().map(|r| r.buttons), Some(Buttons::NONE));
        assert_eq!(pad.update(), None);
    }

    #[test]
    fn test_disconnect_probe_and_freshness() {
        let (mut pad, link, clock) = pad();
        clock.set(5_000);
        link.feed(&[0xAB]);
        pad.update();

        assert!(pad.has_recent_data(1_000));
        assert!(!pad.is_remote_connected());

        link.feed(&[0x42, 0x43]);
        assert!(!pad.is_remote_connected());

        link.feed(&UP_FRAME);
        assert!(pad.is_remote_connected());
        // The start byte was consumed by the probe; the frame still arrives
        assert_eq!(pad.update().map(|r| r.buttons), Some(Buttons::PAD_UP));
    }

    #[test]
    fn test_probe_leaves_following_bytes_buffered() {
        let (mut pad, link, _clock) = pad();
        link.feed(&UP_FRAME);
        assert!(pad.is_remote_connected());
        assert_eq!(link.pending(), UP_FRAME.len() - 1);
    }

    #[test]
    fn test_has_recent_data_window() {
        let (mut pad, link, clock) = pad();
        assert!(!pad.has_recent_data(1_000));

        clock.set(100);
        link.feed(&IDLE_FRAME);
        pad.update();
        clock.advance(1_000);
        assert!(pad.has_recent_data(1_000));
        assert!(pad.is_link_fresh());
        clock.advance(1);
        assert!(!pad.has_recent_data(1_000));
    }

    #[test]
    fn test_neutral_values_before_first_frame() {
        let (pad, _link, _clock) = pad();
        assert_eq!(pad.sticks(), Sticks::NEUTRAL);
        assert_eq!(pad.analog_code(7), 128);
        assert_eq!(pad.analog_code(8), 127);
        assert_eq!(pad.analog_code(42), 0);
        assert_eq!(pad.buttons(), Buttons::NONE);
    }

    #[test]
    fn test_detached_controller() {
        let mut pad: Ps2Uart<ScriptedTransport, _> = Ps2Uart::detached(TestClock::new());
        assert_eq!(pad.begin(), Ok(()));
        assert_eq!(pad.update(), None);
        assert!(!pad.is_remote_connected());
        assert!(!pad.has_recent_data(u32::MAX));
        assert!(pad.transport_mut().is_none());
    }

    #[test]
    fn test_begin_uses_configured_baud() {
        let link = ScriptedTransport::new();
        let config = Config {
            link_baud: 115_200,
            ..Config::default()
        };
        let mut pad = Ps2Uart::with_config(link.clone(), TestClock::new(), config);
        pad.begin().unwrap();
        pad.begin_with(9_600).unwrap();
        assert_eq!(link.baud_history(), Vec::from([115_200, 9_600]));
    }

    #[test]
    fn test_set_debounce_ms() {
        let (mut pad, link, clock) = pad();
        assert_eq!(pad.debounce_ms(), 30);
        pad.set_debounce_ms(100);
        assert_eq!(pad.debounce_ms(), 100);

        link.feed(&UP_FRAME);
        pad.update();
        clock.advance(50);
        link.feed(&UP_FRAME);
        pad.update();
        assert_eq!(pad.buttons(), Buttons::NONE);

        clock.advance(50);
        link.feed(&UP_FRAME);
        pad.update();
        assert_eq!(pad.buttons(), Buttons::PAD_UP);
    }

    #[test]
    fn test_release_returns_transport() {
        let (pad, _link, _clock) = pad();
        assert!(pad.release().is_some());
    }
}
