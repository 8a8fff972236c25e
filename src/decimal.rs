//! Decoder for MySQL's packed-BCD `DECIMAL` wire representation, and the
//! 256-bit unsigned multiply-add it is built on.
//!
//! Wire format: first byte is the scale; each subsequent byte packs two BCD
//! digits, high nibble first, until a nibble reads as a sign marker
//! (`0xB`/`0xD` negative, otherwise positive) rather than `0`-`9` — which
//! ends the digit stream there, whether that nibble is the high or low half
//! of its byte. A DECIMAL fits in at most 65 digits in MySQL, comfortably
//! inside the 77-digit (~256-bit) accumulator this decoder uses.

use crate::error::{protocol_err, Error};

/// A 256-bit unsigned integer represented as four little-endian `u64` limbs
/// (`words[0]` is least significant). Only the handful of operations the BCD
/// decoder needs are implemented — this is not a general bignum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct U256 {
    pub words: [u64; 4],
}

impl U256 {
    pub const ZERO: U256 = U256 { words: [0; 4] };

    /// Computes `self = self * y + z` using 64×64→128 partial products with
    /// carry propagation across all four limbs, and returns the overflow word
    /// (anything that didn't fit in 256 bits) so callers can detect a
    /// coefficient too large to represent.
    pub fn mul_add(&mut self, y: u64, z: u64) -> u64 {
        let mut carry: u128 = z as u128;
        for word in self.words.iter_mut() {
            let prod = (*word as u128) * (y as u128) + carry;
            *word = prod as u64;
            carry = prod >> 64;
        }
        carry as u64
    }

    /// Big-endian bytes, with leading all-zero bytes stripped (but at least
    /// one byte retained for a zero value).
    pub fn to_be_bytes_trimmed(self) -> Vec<u8> {
        let mut full = [0u8; 32];
        for (i, word) in self.words.iter().enumerate() {
            full[32 - 8 * (i + 1)..32 - 8 * i].copy_from_slice(&word.to_be_bytes());
        }
        let first_nonzero = full.iter().position(|&b| b != 0).unwrap_or(31);
        full[first_nonzero..].to_vec()
    }
}

/// A decoded `DECIMAL` value, decomposed the way a `bigdecimal`/`rust_decimal`
/// style type would want it: sign, unsigned coefficient, and an exponent such
/// that the represented value is `(-1)^negative * coefficient * 10^exponent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub negative: bool,
    pub coefficient: Vec<u8>,
    pub exponent: i32,
    scale: u8,
    digits: Vec<u8>,
}

const SIGN_NEGATIVE_A: u8 = 0xB;
const SIGN_NEGATIVE_B: u8 = 0xD;

/// Decodes a packed-BCD `DECIMAL` byte string as MySQL sends it on the wire.
pub fn decode_packed(bytes: &[u8]) -> Result<Decoded, Error> {
    let (&scale, body) = bytes
        .split_first()
        .ok_or_else(|| protocol_err!("empty packed decimal"))?;

    let nibbles = body.len() * 2;
    if nibbles == 0 {
        return Err(protocol_err!("packed decimal has no digits or sign nibble"));
    }

    // The sign nibble terminates the digit stream and can land in either
    // half of a byte: a byte holds two digits only as long as both its
    // nibbles are <= 9. As soon as a nibble reads as a sign marker (> 9),
    // decoding stops there — the high nibble is checked before the low one,
    // so an even digit count ends with a byte whose entire low nibble is
    // unused padding and whose high nibble is the sign.
    let mut digits = Vec::with_capacity(nibbles);
    let mut sign_nibble = None;
    let mut acc = U256::ZERO;
    let mut overflowed = false;

    'digits: for &byte in body {
        let high = byte >> 4;
        let low = byte & 0x0F;

        if high > 9 {
            sign_nibble = Some(high);
            break 'digits;
        }
        digits.push(high);

        if low > 9 {
            sign_nibble = Some(low);
            break 'digits;
        }
        digits.push(low);
    }

    let sign_nibble =
        sign_nibble.ok_or_else(|| protocol_err!("packed decimal missing its terminating sign nibble"))?;

    for &digit in &digits {
        if acc.mul_add(10, digit as u64) != 0 {
            overflowed = true;
        }
    }
    if overflowed {
        return Err(protocol_err!("packed decimal coefficient overflows 256 bits"));
    }

    let negative = sign_nibble == SIGN_NEGATIVE_A || sign_nibble == SIGN_NEGATIVE_B;

    Ok(Decoded {
        negative,
        coefficient: acc.to_be_bytes_trimmed(),
        exponent: -(scale as i32),
        scale,
        digits,
    })
}

impl Decoded {
    /// Renders the decimal as a plain `[-]digits[.digits]` string. Leading
    /// zero digits in the integer part are stripped (keeping at least one),
    /// matching how MySQL's own packed representation pads the stored digit
    /// count up to the column's declared precision.
    pub fn to_decimal_string(&self) -> String {
        let digit_chars: String = self.digits.iter().map(|d| (b'0' + d) as char).collect();
        let scale = self.scale as usize;

        let mut s = String::with_capacity(digit_chars.len() + 2);
        if self.negative {
            s.push('-');
        }

        if digit_chars.len() > scale {
            let split = digit_chars.len() - scale;
            let int_part = digit_chars[..split].trim_start_matches('0');
            s.push_str(if int_part.is_empty() { "0" } else { int_part });
            if scale > 0 {
                s.push('.');
                s.push_str(&digit_chars[split..]);
            }
        } else {
            s.push_str("0.");
            for _ in 0..(scale - digit_chars.len()) {
                s.push('0');
            }
            s.push_str(&digit_chars);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_add_propagates_carry_across_limbs() {
        let mut x = U256 { words: [u64::MAX, 0, 0, 0] };
        let overflow = x.mul_add(2, 1);
        assert_eq!(overflow, 0);
        assert_eq!(x.words[0], u64::MAX.wrapping_mul(2).wrapping_add(1));
        assert_eq!(x.words[1], 1);
    }

    #[test]
    fn decodes_positive_scale_two() {
        // 123.45 packed as: scale=2, digits 1 2 3 4 5, sign positive (0xC)
        let bytes = vec![2u8, 0x12, 0x34, 0x5C];
        let decoded = decode_packed(&bytes).unwrap();
        assert!(!decoded.negative);
        assert_eq!(decoded.to_decimal_string(), "123.45");
    }

    #[test]
    fn decodes_negative_sign_nibble() {
        let bytes = vec![2u8, 0x12, 0x34, 0x5D];
        let decoded = decode_packed(&bytes).unwrap();
        assert!(decoded.negative);
        assert_eq!(decoded.to_decimal_string(), "-123.45");
    }

    #[test]
    fn decodes_leading_zero_scale() {
        let bytes = vec![0u8, 0x01, 0x2C];
        let decoded = decode_packed(&bytes).unwrap();
        assert_eq!(decoded.to_decimal_string(), "12");
    }

    #[test]
    fn even_digit_count_ends_with_a_sign_only_byte() {
        // digits 1 2 3 4, sign lands alone in the final byte's high nibble
        // (0xC0): a decoder that blindly read that byte's high nibble as a
        // digit would corrupt the coefficient to 12345.
        let bytes = vec![0u8, 0x12, 0x34, 0xC0];
        let decoded = decode_packed(&bytes).unwrap();
        assert!(!decoded.negative);
        assert_eq!(decoded.to_decimal_string(), "1234");
    }
}
