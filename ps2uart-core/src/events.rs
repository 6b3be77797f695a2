//! Press/release/change edge accumulation with one-shot queries.

use ps2uart_proto::Buttons;

use crate::debounce::Transition;

/// Accumulated edge events since the last matching query.
///
/// Events of the same direction on the same button coalesce: two presses
/// of a button between queries are reported once.
#[derive(Clone, Debug, Default)]
pub struct EdgeTracker {
    pressed: Buttons,
    released: Buttons,
    changed: Buttons,
    /// Time each button became stably pressed; `None` while released.
    hold_start_ms: [Option<u32>; 16],
}

impl EdgeTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pressed: Buttons::NONE,
            released: Buttons::NONE,
            changed: Buttons::NONE,
            hold_start_ms: [None; 16],
        }
    }

    /// Record the edges implied by a stable transition at `now_ms`.
    pub fn record(&mut self, transition: Transition, now_ms: u32) {
        let Transition { previous, current } = transition;

        let pressed = current & !previous;
        let released = previous & !current;

        self.pressed |= pressed;
        for bit in pressed.bits() {
            self.hold_start_ms[bit] = Some(now_ms);
        }

        self.released |= released;
        for bit in released.bits() {
            self.hold_start_ms[bit] = None;
        }

        self.changed |= Buttons(previous.raw() ^ current.raw());
    }

    /// One-shot press query: clears and reports the pending press bits in `mask`.
    pub fn take_pressed(&mut self, mask: Buttons) -> bool {
        take(&mut self.pressed, mask)
    }

    /// One-shot release query.
    pub fn take_released(&mut self, mask: Buttons) -> bool {
        take(&mut self.released, mask)
    }

    /// One-shot change query.
    pub fn take_changed(&mut self, mask: Buttons) -> bool {
        take(&mut self.changed, mask)
    }

    /// Pending press bits, without clearing.
    #[inline]
    #[must_use]
    pub const fn pending_pressed(&self) -> Buttons {
        self.pressed
    }

    /// Pending release bits, without clearing.
    #[inline]
    #[must_use]
    pub const fn pending_released(&self) -> Buttons {
        self.released
    }

    /// Pending change bits, without clearing.
    #[inline]
    #[must_use]
    pub const fn pending_changed(&self) -> Buttons {
        self.changed
    }

    /// When the lowest button in `mask` became stably pressed.
    #[must_use]
    pub fn hold_start_ms(&self, mask: Buttons) -> Option<u32> {
        mask.lowest_bit().and_then(|bit| self.hold_start_ms[bit])
    }

    /// Drop all pending events and hold timestamps.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

fn take(acc: &mut Buttons, mask: Buttons) -> bool {
    let hit = *acc & mask;
    if hit.is_empty() {
        return false;
    }
    *acc &= !hit;
    true
}
