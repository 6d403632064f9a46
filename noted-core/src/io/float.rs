//! # Float transport
//!
//! `f32` to and from portable IEEE-754 single bit patterns. The patterns are then written big-endian
//! like every other integer in the format.
//!
//! Normal and subnormal values travel as their exact bits. The special cases are fixed:
//! * Zero of either sign is `0x0000_0000`.
//! * Every NaN is [`NAN_BITS`], a quiet exponent with a fixed payload rather than whatever the host
//!   produced.
//!
//! Decoding maps those back to `+0.0` and the canonical NaN, so `encode(decode(bits)) == bits` for
//! anything `encode` can produce.

/// Exponent all ones, mantissa 1234.
pub const NAN_BITS: u32 = 0x7F80_0000 | 1234;
pub const INFINITY_BITS: u32 = 0x7F80_0000;
pub const NEG_INFINITY_BITS: u32 = 0xFF80_0000;

const EXPONENT_MASK: u32 = 0x7F80_0000;
const MANTISSA_MASK: u32 = 0x007F_FFFF;

#[must_use]
pub fn encode(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        NAN_BITS
    } else if value == f32::INFINITY {
        INFINITY_BITS
    } else if value == f32::NEG_INFINITY {
        NEG_INFINITY_BITS
    } else {
        value.to_bits()
    }
}

#[must_use]
pub fn decode(bits: u32) -> f32 {
    let exponent = bits & EXPONENT_MASK;
    let mantissa = bits & MANTISSA_MASK;
    match (exponent, mantissa) {
        // Negative zero loses its sign.
        (0, 0) => 0.0,
        (EXPONENT_MASK, m) if m != 0 => f32::NAN,
        _ => f32::from_bits(bits),
    }
}

#[cfg(test)]
mod test {
    use super::{decode, encode, INFINITY_BITS, NAN_BITS, NEG_INFINITY_BITS};

    const REPRESENTATIVE: [f32; 9] = [
        0.0,
        1.0,
        -1.0,
        123.456,
        f32::MIN_POSITIVE,
        f32::MAX,
        f32::NAN,
        f32::INFINITY,
        f32::NEG_INFINITY,
    ];

    #[test]
    fn known_patterns() {
        assert_eq!(encode(0.0), 0);
        assert_eq!(encode(-0.0), 0);
        assert_eq!(encode(1.0), 0x3F80_0000);
        assert_eq!(encode(-1.0), 0xBF80_0000);
        assert_eq!(encode(f32::MIN_POSITIVE), 0x0080_0000);
        assert_eq!(encode(f32::MAX), 0x7F7F_FFFF);
        assert_eq!(encode(f32::INFINITY), INFINITY_BITS);
        assert_eq!(encode(f32::NEG_INFINITY), NEG_INFINITY_BITS);
        assert_eq!(encode(f32::NAN), 0x7F80_04D2);
        assert_eq!(encode(-f32::NAN), NAN_BITS);
    }
    #[test]
    fn patterns_survive_decoding() {
        for value in REPRESENTATIVE {
            let bits = encode(value);
            assert_eq!(encode(decode(bits)), bits, "{value}");
        }
    }
    #[test]
    fn values_survive_encoding() {
        for value in REPRESENTATIVE {
            let back = decode(encode(value));
            if value.is_nan() {
                assert!(back.is_nan());
            } else {
                assert_eq!(back, value);
            }
        }
        // Smallest subnormal.
        assert_eq!(decode(encode(f32::from_bits(1))), f32::from_bits(1));
    }
    #[test]
    fn foreign_nans() {
        // A quiet NaN written by something else still reads as NaN.
        assert!(decode(0x7FC0_0000).is_nan());
        assert!(decode(0xFFC0_0001).is_nan());
        assert_eq!(decode(0x8000_0000).to_bits(), 0);
    }
}
