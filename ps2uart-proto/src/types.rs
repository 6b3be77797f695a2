//! Core PS2 pad types: Buttons, Axis, Sticks, Vibrate.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Button state represented as a bitfield, one bit per PS2 button.
///
/// The bit layout is the wire layout: `buttonsHigh` is the upper byte,
/// `buttonsLow` the lower byte. Implements bitwise operators so masks can
/// be combined for queries.
///
/// # Example
///
/// ```
/// use ps2uart_proto::Buttons;
///
/// let buttons = Buttons::CROSS | Buttons::L1;
/// assert!(buttons.contains(Buttons::CROSS));
/// assert!(buttons.intersects(Buttons::L1 | Buttons::R1));
/// assert!(!buttons.contains(Buttons::START));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u16);

impl Buttons {
    pub const SELECT: Self = Self(0x0001);
    pub const L3: Self = Self(0x0002);
    pub const R3: Self = Self(0x0004);
    pub const START: Self = Self(0x0008);
    pub const PAD_UP: Self = Self(0x0010);
    pub const PAD_RIGHT: Self = Self(0x0020);
    pub const PAD_DOWN: Self = Self(0x0040);
    pub const PAD_LEFT: Self = Self(0x0080);
    pub const L2: Self = Self(0x0100);
    pub const R2: Self = Self(0x0200);
    pub const L1: Self = Self(0x0400);
    pub const R1: Self = Self(0x0800);
    pub const TRIANGLE: Self = Self(0x1000);
    pub const CIRCLE: Self = Self(0x2000);
    pub const CROSS: Self = Self(0x4000);
    pub const SQUARE: Self = Self(0x8000);

    // Colour aliases used by some PS2 libraries
    pub const GREEN: Self = Self::TRIANGLE;
    pub const RED: Self = Self::CIRCLE;
    pub const BLUE: Self = Self::CROSS;
    pub const PINK: Self = Self::SQUARE;

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Every button.
    pub const ALL: Self = Self(0xFFFF);

    /// Build a mask from the two wire bytes.
    #[inline]
    #[must_use]
    pub const fn from_wire(high: u8, low: u8) -> Self {
        Self(((high as u16) << 8) | low as u16)
    }

    /// Check if all of the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Buttons) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Check if any of the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn intersects(self, button: Buttons) -> bool {
        (self.0 & button.0) != 0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Buttons, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    /// Get the raw u16 value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Index of the lowest set bit, if any.
    #[inline]
    #[must_use]
    pub const fn lowest_bit(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Iterate over the bit indices (0..16) that are set.
    pub fn bits(self) -> impl Iterator<Item = usize> {
        (0..16).filter(move |bit| self.0 & (1 << bit) != 0)
    }
}

impl From<u16> for Buttons {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Buttons {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Buttons {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Buttons {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

/// Analog axis selector, numbered like the PS2X `PSS_*` constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Axis {
    RightX = 5,
    RightY = 6,
    LeftX = 7,
    LeftY = 8,
}

impl Axis {
    /// Look up an axis by its PS2X code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            5 => Some(Self::RightX),
            6 => Some(Self::RightY),
            7 => Some(Self::LeftX),
            8 => Some(Self::LeftY),
            _ => None,
        }
    }
}

/// Both analog sticks, 0-255 per axis.
///
/// The pad reports roughly 127/128 at rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sticks {
    pub left_x: u8,
    pub left_y: u8,
    pub right_x: u8,
    pub right_y: u8,
}

impl Sticks {
    /// Resting position reported before the first frame arrives.
    pub const NEUTRAL: Self = Self {
        left_x: 128,
        left_y: 127,
        right_x: 128,
        right_y: 127,
    };

    /// Read a single axis.
    #[inline]
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> u8 {
        match axis {
            Axis::LeftX => self.left_x,
            Axis::LeftY => self.left_y,
            Axis::RightX => self.right_x,
            Axis::RightY => self.right_y,
        }
    }
}

impl Default for Sticks {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Single-byte rumble command sent host to pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Vibrate {
    Both = 0x01,
    Left = 0x02,
    Right = 0x03,
}

impl Vibrate {
    /// Wire byte for this command.
    #[inline]
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}
