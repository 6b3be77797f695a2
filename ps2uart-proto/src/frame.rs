//! Byte-stream framer for the PS2-over-UART link.
//!
//! Wire frame (pad to host, 8 bytes, no checksum):
//!
//! ```text
//! 0x0D buttonsHigh buttonsLow leftY leftX rightY rightX 0x0A
//! ```
//!
//! A lone `0xAB` may appear at any point and means the pad side lost its
//! controller. Everything after it is noise until the next `0x0D`.

use log::debug;

/// Start-of-frame sentinel.
pub const START_BYTE: u8 = 0x0D;

/// End-of-frame sentinel.
pub const END_BYTE: u8 = 0x0A;

/// Link-down sentinel sent by the pad bridge.
pub const DISCONNECT_BYTE: u8 = 0xAB;

/// Number of meaningful payload bytes in a frame.
pub const PAYLOAD_LEN: usize = 6;

/// Receive buffer capacity. Over-length frames are clamped into the last slot.
pub const FRAME_BUFFER_LEN: usize = 8;

/// The six payload bytes of a completed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub payload: [u8; PAYLOAD_LEN],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramerState {
    /// Waiting for a start sentinel.
    Idle,
    /// Collecting payload bytes.
    Receiving,
    /// Link reported down; discarding until the next start sentinel.
    Ignoring,
}

/// Three-state frame assembler.
///
/// Bytes are pushed one at a time. Once a frame is complete the assembler
/// refuses further bytes until the frame has been taken, so a caller that
/// stops reading when [`push`](Self::push) returns `true` leaves the rest
/// of the stream buffered in the transport.
#[derive(Clone, Debug)]
pub struct FrameAssembler {
    buffer: [u8; FRAME_BUFFER_LEN],
    index: usize,
    state: FramerState,
    ready: bool,
    pending_start: bool,
}

impl FrameAssembler {
    /// Create a new assembler in the idle state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; FRAME_BUFFER_LEN],
            index: 0,
            state: FramerState::Idle,
            ready: false,
            pending_start: false,
        }
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> FramerState {
        self.state
    }

    /// `true` while a completed frame is waiting to be taken.
    #[inline]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// `true` unless a disconnect sentinel is in effect.
    #[inline]
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        !matches!(self.state, FramerState::Ignoring)
    }

    /// `true` if a start sentinel was seen out of band and not yet applied.
    #[inline]
    #[must_use]
    pub const fn has_pending_start(&self) -> bool {
        self.pending_start
    }

    /// Feed a byte.
    ///
    /// Returns `true` when this byte completed a frame. Bytes pushed while a
    /// frame is ready are ignored and `true` is returned again.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.ready {
            return true;
        }

        if byte == DISCONNECT_BYTE {
            self.disconnect();
            return false;
        }

        match self.state {
            FramerState::Ignoring => {
                if byte == START_BYTE {
                    debug!("start sentinel after link loss, resynchronising");
                    self.start();
                }
            }
            FramerState::Idle => {
                if byte == START_BYTE {
                    self.start();
                }
            }
            FramerState::Receiving => {
                if byte == END_BYTE {
                    self.finish();
                } else {
                    self.buffer[self.index] = byte;
                    self.index = (self.index + 1).min(FRAME_BUFFER_LEN - 1);
                }
            }
        }

        self.ready
    }

    /// Take the completed frame, if any, re-arming the assembler.
    pub fn take_frame(&mut self) -> Option<Frame> {
        if !self.ready {
            return None;
        }
        self.ready = false;

        let mut payload = [0u8; PAYLOAD_LEN];
        payload.copy_from_slice(&self.buffer[..PAYLOAD_LEN]);
        Some(Frame { payload })
    }

    /// Enter the ignoring state, dropping any partial or unread frame.
    pub fn disconnect(&mut self) {
        if self.state != FramerState::Ignoring {
            debug!("disconnect sentinel, ignoring input until next start");
        }
        self.state = FramerState::Ignoring;
        self.index = 0;
        self.ready = false;
        self.pending_start = false;
    }

    /// Record a start sentinel that was consumed outside of [`push`](Self::push).
    ///
    /// The link counts as connected again immediately; the transition to
    /// receiving happens on the next [`apply_pending_start`](Self::apply_pending_start).
    pub fn note_start(&mut self) {
        self.pending_start = true;
        if self.state == FramerState::Ignoring {
            self.state = FramerState::Idle;
        }
    }

    /// Begin receiving if a start sentinel was recorded out of band.
    pub fn apply_pending_start(&mut self) {
        if self.pending_start {
            self.pending_start = false;
            self.start();
        }
    }

    /// Drop a frame in progress, including one opened by a pending start,
    /// without touching the link state.
    ///
    /// Used when bytes are drained from the transport behind the assembler's back.
    pub fn abort_partial(&mut self) {
        if self.state == FramerState::Receiving {
            self.state = FramerState::Idle;
        }
        self.index = 0;
        self.pending_start = false;
    }

    /// Return to the power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn start(&mut self) {
        self.state = FramerState::Receiving;
        self.index = 0;
    }

    fn finish(&mut self) {
        let len = self.index;
        self.buffer[self.index] = END_BYTE;
        self.state = FramerState::Idle;
        self.index = 0;

        if len < PAYLOAD_LEN {
            debug!("dropping truncated frame ({} payload bytes)", len);
            return;
        }
        self.ready = true;
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    const UP_FRAME: [u8; 8] = [0x0D, 0x00, 0x10, 0x7F, 0x80, 0x7F, 0x80, 0x0A];

    fn feed(asm: &mut FrameAssembler, bytes: &[u8]) -> usize {
        let mut consumed = 0;
        for &b in bytes {
            consumed += 1;
            if asm.push(b) {
                break;
            }
        }
        consumed
    }

    #[test]
    fn test_complete_frame() {
        let mut asm = FrameAssembler::new();
        assert_eq!(feed(&mut asm, &UP_FRAME), 8);
        assert!(asm.is_ready());
        let frame = asm.take_frame().unwrap();
        assert_eq!(frame.payload, [0x00, 0x10, 0x7F, 0x80, 0x7F, 0x80]);
        assert!(!asm.is_ready());
        assert_eq!(asm.state(), FramerState::Idle);
    }

    #[test]
    fn test_leading_noise_ignored() {
        let mut asm = FrameAssembler::new();
        feed(&mut asm, &[0x11, 0x22, 0x0A, 0x33]);
        assert_eq!(asm.state(), FramerState::Idle);
        feed(&mut asm, &UP_FRAME);
        assert!(asm.take_frame().is_some());
    }

    #[test]
    fn test_frame_split_across_calls() {
        let mut asm = FrameAssembler::new();
        feed(&mut asm, &UP_FRAME[..3]);
        assert!(!asm.is_ready());
        assert_eq!(asm.state(), FramerState::Receiving);
        feed(&mut asm, &UP_FRAME[3..]);
        assert!(asm.is_ready());
    }

    #[test]
    fn test_backpressure_keeps_first_frame() {
        let mut asm = FrameAssembler::new();
        feed(&mut asm, &UP_FRAME);
        // Second frame bytes pushed while the first is unread are refused
        let other = [0x0D, 0x40, 0x00, 1, 2, 3, 4, 0x0A];
        for &b in &other {
            assert!(asm.push(b));
        }
        assert_eq!(asm.take_frame().unwrap().payload[1], 0x10);
    }

    #[test]
    fn test_disconnect_mid_frame_resyncs_on_start() {
        let mut asm = FrameAssembler::new();
        feed(&mut asm, &[0x0D, 0x12, 0x34, 0xAB, 0x55, 0x0A, 0x66]);
        assert_eq!(asm.state(), FramerState::Ignoring);
        assert!(!asm.is_connected());
        assert!(!asm.is_ready());

        feed(&mut asm, &UP_FRAME);
        let frame = asm.take_frame().unwrap();
        assert_eq!(frame.payload, [0x00, 0x10, 0x7F, 0x80, 0x7F, 0x80]);
        assert!(asm.is_connected());
    }

    #[test]
    fn test_start_while_ignoring_enters_receiving() {
        let mut asm = FrameAssembler::new();
        asm.push(0xAB);
        asm.push(0x0D);
        assert_eq!(asm.state(), FramerState::Receiving);
    }

    #[test]
    fn test_disconnect_clears_ready_flag() {
        let mut asm = FrameAssembler::new();
        feed(&mut asm, &UP_FRAME);
        asm.disconnect();
        assert!(!asm.is_ready());
        assert!(asm.take_frame().is_none());
    }

    #[test]
    fn test_truncated_frame_dropped() {
        let mut asm = FrameAssembler::new();
        feed(&mut asm, &[0x0D, 0x01, 0x02, 0x0A]);
        assert!(!asm.is_ready());
        assert_eq!(asm.state(), FramerState::Idle);
    }

    #[test]
    fn test_overlong_frame_clamped() {
        let mut asm = FrameAssembler::new();
        let mut bytes = std::vec![0x0D];
        bytes.extend(1u8..=20);
        bytes.push(0x0A);
        feed(&mut asm, &bytes);
        assert!(asm.is_ready());
        assert_eq!(asm.take_frame().unwrap().payload, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_start_byte_inside_frame_is_data() {
        let mut asm = FrameAssembler::new();
        feed(&mut asm, &[0x0D, 0x00, 0x0D, 1, 2, 3, 4, 0x0A]);
        assert_eq!(asm.take_frame().unwrap().payload, [0x00, 0x0D, 1, 2, 3, 4]);
    }

    #[test]
    fn test_pending_start() {
        let mut asm = FrameAssembler::new();
        asm.push(0xAB);
        asm.note_start();
        assert!(asm.is_connected());
        assert!(asm.has_pending_start());

        asm.apply_pending_start();
        assert!(!asm.has_pending_start());
        assert_eq!(asm.state(), FramerState::Receiving);

        feed(&mut asm, &UP_FRAME[1..]);
        assert!(asm.take_frame().is_some());
    }

    #[test]
    fn test_abort_partial_keeps_link_state() {
        let mut asm = FrameAssembler::new();
        feed(&mut asm, &[0x0D, 0x01]);
        asm.abort_partial();
        assert_eq!(asm.state(), FramerState::Idle);

        asm.push(0xAB);
        asm.abort_partial();
        assert_eq!(asm.state(), FramerState::Ignoring);
    }
}
