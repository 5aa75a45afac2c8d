//! Number encoding for a 4-digit seven-segment display.
//!
//! Segment bytes are laid out the way the TM1637 expects them: bit 0 is
//! segment A, bit 6 segment G, bit 7 the colon/decimal point.

pub const DIGITS: usize = 4;
pub const DISPLAY_MAX: i32 = 9999;
pub const DISPLAY_MIN: i32 = -999;

const DIGIT_SEGMENTS: [u8; 10] = [
    0x3f, // 0
    0x06, // 1
    0x5b, // 2
    0x4f, // 3
    0x66, // 4
    0x6d, // 5
    0x7d, // 6
    0x07, // 7
    0x7f, // 8
    0x6f, // 9
];
const MINUS: u8 = 0x40;
const BLANK: u8 = 0x00;

/// Right-aligned decimal rendering. Values outside the displayable range are
/// clamped rather than wrapped.
pub fn encode_number(value: i32, leading_zeros: bool) -> [u8; DIGITS] {
    let value = value.clamp(DISPLAY_MIN, DISPLAY_MAX);
    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    let mut out = [BLANK; DIGITS];

    // Fill from the right; a minus sign takes one position.
    let width = if negative { DIGITS - 1 } else { DIGITS };
    let mut pos = DIGITS;
    for i in 0..width {
        if magnitude == 0 && i > 0 && !leading_zeros {
            break;
        }
        pos -= 1;
        out[pos] = DIGIT_SEGMENTS[(magnitude % 10) as usize];
        magnitude /= 10;
    }
    if negative {
        if leading_zeros {
            out[0] = MINUS;
        } else {
            out[pos.saturating_sub(1)] = MINUS;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: [u8; 10] = DIGIT_SEGMENTS;

    #[test]
    fn zero_is_single_digit() {
        assert_eq!(encode_number(0, false), [BLANK, BLANK, BLANK, D[0]]);
    }

    #[test]
    fn right_aligned_without_leading_zeros() {
        assert_eq!(encode_number(72, false), [BLANK, BLANK, D[7], D[2]]);
        assert_eq!(encode_number(72, true), [D[0], D[0], D[7], D[2]]);
    }

    #[test]
    fn mode_switch_marker() {
        assert_eq!(encode_number(9999, false), [D[9]; 4]);
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(encode_number(12_345, false), [D[9]; 4]);
        assert_eq!(encode_number(-5000, false), [MINUS, D[9], D[9], D[9]]);
    }

    #[test]
    fn negative_values_get_a_minus() {
        assert_eq!(encode_number(-5, false), [BLANK, BLANK, MINUS, D[5]]);
        assert_eq!(encode_number(-5, true), [MINUS, D[0], D[0], D[5]]);
    }
}
