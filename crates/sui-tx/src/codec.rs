//! Numeric encoding/decoding utilities
//!
//! Move integers come back from devInspect as little-endian BCS bytes and
//! token amounts are fixed-point integers scaled by `10^decimals`:
//! - `bytes_to_uint`: little-endian bytes to an arbitrary-precision integer
//! - `format_units` / `parse_units`: fixed-point integer <-> decimal string
//! - `decode_u8` / `decode_u64` / `decode_u128`: strict BCS integer decoding

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

/// Decode little-endian bytes into an unsigned big integer.
///
/// Items may be plain `u8` or `Option<u8>`; absent slots count as zero.
/// No width limit: 16 bytes of `0xff` decode to `2^128 - 1`.
pub fn bytes_to_uint<I>(bytes: I) -> BigUint
where
    I: IntoIterator,
    I::Item: Into<Option<u8>>,
    I::IntoIter: DoubleEndedIterator,
{
    bytes.into_iter().rev().fold(BigUint::zero(), |acc, byte| {
        (acc << 8u32) | BigUint::from(byte.into().unwrap_or(0))
    })
}

/// Render a fixed-point integer as a decimal string.
///
/// `format_units(&12345.into(), 3)` is `"12.345"`; trailing fractional zeros
/// are dropped together with the dot (`100000` at 3 decimals is `"100"`).
pub fn format_units(value: &BigInt, decimals: usize) -> String {
    let negative = value.sign() == Sign::Minus;
    let mut digits = value.magnitude().to_string();

    if digits.len() < decimals + 1 {
        digits = format!("{:0>width$}", digits, width = decimals + 1);
    }

    let (integer, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    let mut out = String::with_capacity(digits.len() + 2);
    if negative {
        out.push('-');
    }
    out.push_str(if integer.is_empty() { "0" } else { integer });
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Parse a decimal string into a fixed-point integer with `decimals` places.
///
/// Malformed input yields zero instead of an error. Digits beyond `decimals`
/// are rounded half away from zero at the truncation boundary only:
/// the kept prefix is rounded as an integer using the excess as its
/// remainder. A non-zero prefix is replaced by that rounded integer verbatim,
/// so `"1.0531"` at 2 decimals gives `15`, not `105`; balance displays rely on
/// this exact behaviour.
pub fn parse_units(value: &str, decimals: usize) -> BigInt {
    let mut parts = value.split('.');
    let mut integer = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or("0");

    let negative = integer.starts_with('-');
    if negative {
        integer = &integer[1..];
    }

    if !is_digits(integer) || !is_digits(fraction) {
        return BigInt::zero();
    }

    let fraction = fraction.trim_end_matches('0');

    let digits = if decimals == 0 {
        round_half_up(integer, fraction).to_string()
    } else if fraction.len() > decimals {
        let (before, after) = fraction.split_at(decimals);
        let rounded = round_half_up(before, after);
        let kept_zeros = if before.bytes().all(|b| b == b'0') {
            &before[..before.len() - 1]
        } else {
            ""
        };
        format!("{}{}{}", integer, kept_zeros, rounded)
    } else {
        format!("{}{:0<width$}", integer, fraction, width = decimals)
    };

    if digits.is_empty() {
        return BigInt::zero();
    }

    match BigUint::parse_bytes(digits.as_bytes(), 10) {
        Some(magnitude) => {
            let sign = if negative { Sign::Minus } else { Sign::Plus };
            BigInt::from_biguint(sign, magnitude)
        }
        None => BigInt::zero(),
    }
}

/// Decode little-endian bytes and render them at `decimals` places as `f64`.
///
/// For display figures only (tank balances, rewards).
pub fn to_display_amount(bytes: &[u8], decimals: usize) -> f64 {
    let value = BigInt::from(bytes_to_uint(bytes.iter().copied()));
    format_units(&value, decimals).parse().unwrap_or(0.0)
}

/// Round `whole.remainder` to the nearest integer, halves going up.
fn round_half_up(whole: &str, remainder: &str) -> BigUint {
    let base = if whole.is_empty() {
        BigUint::zero()
    } else {
        BigUint::parse_bytes(whole.as_bytes(), 10).unwrap_or_default()
    };

    match remainder.bytes().next() {
        Some(first) if first >= b'5' => base + 1u32,
        _ => base,
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Decode a BCS `u8`
pub fn decode_u8(bytes: &[u8]) -> Result<u8, CodecError> {
    let raw: [u8; 1] = fixed_width(bytes)?;
    Ok(raw[0])
}

/// Decode a BCS `u64` (little-endian)
pub fn decode_u64(bytes: &[u8]) -> Result<u64, CodecError> {
    Ok(u64::from_le_bytes(fixed_width(bytes)?))
}

/// Decode a BCS `u128` (little-endian)
pub fn decode_u128(bytes: &[u8]) -> Result<u128, CodecError> {
    Ok(u128::from_le_bytes(fixed_width(bytes)?))
}

fn fixed_width<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::EmptyInput);
    }
    bytes.try_into().map_err(|_| CodecError::InvalidLength {
        expected: N,
        found: bytes.len(),
    })
}

/// Errors that can occur during BCS value decoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Empty input")]
    EmptyInput,

    #[error("Invalid length: expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },
}
