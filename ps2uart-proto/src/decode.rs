//! Payload decoding.
//!
//! Layout of the six payload bytes:
//!
//! | Offset | Field        |
//! |--------|--------------|
//! | 0      | buttons high |
//! | 1      | buttons low  |
//! | 2      | left Y       |
//! | 3      | left X       |
//! | 4      | right Y      |
//! | 5      | right X      |
//!
//! There is no validation step: every payload decodes to some report.

use crate::frame::{Frame, PAYLOAD_LEN};
use crate::types::{Buttons, Sticks};

/// One decoded frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadReport {
    /// Undebounced button mask.
    pub buttons: Buttons,
    pub sticks: Sticks,
}

/// Decode a completed frame.
#[inline]
#[must_use]
pub fn decode(frame: &Frame) -> PadReport {
    decode_payload(&frame.payload)
}

/// Decode the first six bytes of `payload`.
///
/// Returns `None` if fewer than six bytes are given; trailing bytes are ignored.
#[must_use]
pub fn decode_bytes(payload: &[u8]) -> Option<PadReport> {
    let payload: &[u8; PAYLOAD_LEN] = payload.get(..PAYLOAD_LEN)?.try_into().ok()?;
    Some(decode_payload(payload))
}

#[inline]
fn decode_payload(p: &[u8; PAYLOAD_LEN]) -> PadReport {
    PadReport {
        buttons: Buttons::from_wire(p[0], p[1]),
        sticks: Sticks {
            left_y: p[2],
            left_x: p[3],
            right_y: p[4],
            right_x: p[5],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pad_up_frame() {
        let frame = Frame {
            payload: [0x00, 0x10, 0x7F, 0x80, 0x7F, 0x80],
        };
        let report = decode(&frame);
        assert_eq!(report.buttons, Buttons::PAD_UP);
        assert_eq!(report.sticks.left_y, 0x7F);
        assert_eq!(report.sticks.left_x, 0x80);
        assert_eq!(report.sticks.right_y, 0x7F);
        assert_eq!(report.sticks.right_x, 0x80);
    }

    #[test]
    fn test_decode_high_byte_buttons() {
        let report = decode_bytes(&[0xC0, 0x08, 0, 255, 10, 20]).unwrap();
        assert_eq!(report.buttons, Buttons::SQUARE | Buttons::CROSS | Buttons::START);
        assert_eq!(report.sticks.left_x, 255);
        assert_eq!(report.sticks.right_x, 20);
    }

    #[test]
    fn test_decode_bytes_short_input() {
        assert_eq!(decode_bytes(&[1, 2, 3, 4, 5]), None);
    }

    #[test]
    fn test_decode_bytes_ignores_trailing() {
        let a = decode_bytes(&[1, 2, 3, 4, 5, 6]).unwrap();
        let b = decode_bytes(&[1, 2, 3, 4, 5, 6, 0x0A, 0xFF]).unwrap();
        assert_eq!(a, b);
    }
}
