//! Big-endian bit-range extraction over the `'0'`/`'1'` strings produced by
//! [`super::convert`]. Backed by `bitvec` so field extraction reads as
//! range-indexing rather than hand-rolled shifting.

use bitvec::prelude::*;

/// Parse a string of `'0'`/`'1'` characters into a bit-exact, MSB-first
/// `BitVec`. Panics are avoided entirely: callers are expected to validate
/// length before calling `unsigned`/`signed`, which themselves return
/// `Result`.
pub fn parse(bits: &str) -> BitVec<u8, Msb0> {
    let mut out = BitVec::<u8, Msb0>::with_capacity(bits.len());
    for c in bits.chars() {
        out.push(c == '1');
    }
    out
}

/// Extract `bits[start..end)` (big-endian, MSB-first) as an unsigned value.
pub fn unsigned(bits: &BitVec<u8, Msb0>, start: usize, end: usize) -> Result<u64, String> {
    let slice = bits
        .get(start..end)
        .ok_or_else(|| format!("range {start}..{end} out of bounds (len={})", bits.len()))?;
    let mut value: u64 = 0;
    for bit in slice.iter() {
        value = (value << 1) | (*bit as u64);
    }
    Ok(value)
}

/// Extract `bits[start..end)` as a two's-complement signed value of that
/// width.
pub fn signed(bits: &BitVec<u8, Msb0>, start: usize, end: usize) -> Result<i64, String> {
    let width = end - start;
    let raw = unsigned(bits, start, end)?;
    let sign_bit = 1u64 << (width - 1);
    let value = if raw & sign_bit != 0 {
        raw as i64 - (1i64 << width)
    } else {
        raw as i64
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_extracts_msb_first() {
        let bits = parse("1010");
        assert_eq!(unsigned(&bits, 0, 4).unwrap(), 0b1010);
        assert_eq!(unsigned(&bits, 0, 2).unwrap(), 0b10);
    }

    #[test]
    fn signed_handles_negative_twos_complement() {
        // 12-bit field, all ones except leading bit pattern for -1.
        let bits = parse(&"1".repeat(12));
        assert_eq!(signed(&bits, 0, 12).unwrap(), -1);
    }

    #[test]
    fn signed_handles_positive_value() {
        let bits = parse("011111111111");
        assert_eq!(signed(&bits, 0, 12).unwrap(), 2047);
    }

    #[test]
    fn out_of_bounds_range_is_an_error() {
        let bits = parse("0101");
        assert!(unsigned(&bits, 0, 10).is_err());
    }
}
