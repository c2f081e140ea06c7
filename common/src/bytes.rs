//! Fixed-width big-endian conversions and byte-array helpers.
//!
//! These are the primitives the KDF counter encoding, the ECDSA signature
//! format conversion, and MAC verification are built on.

use subtle::{Choice, ConstantTimeEq};

/// Big-endian two's-complement encoding of a 32-bit integer.
#[must_use]
pub fn big_endian_bytes(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Big-endian encoding of an unsigned 32-bit integer.
#[must_use]
pub fn big_endian_bytes_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Concatenate byte slices into one owned array.
#[must_use]
pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let total = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// The first half of a slice (length rounded down).
#[must_use]
pub fn left_half(bytes: &[u8]) -> &[u8] {
    &bytes[..bytes.len() / 2]
}

/// The second half of a slice.
#[must_use]
pub fn right_half(bytes: &[u8]) -> &[u8] {
    &bytes[bytes.len() / 2..]
}

/// Number of whole bytes needed for `bits` bits.
#[must_use]
pub fn byte_length(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Constant-time equality over byte slices.
///
/// Always scans the full length of the longer input, reading a zero for the
/// missing positions of the shorter one, so the running time does not key on
/// where a length mismatch would otherwise short-circuit. Unequal lengths
/// yield `false` only after the full scan.
#[must_use]
pub fn constant_time_equals(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut equal = Choice::from(1u8);
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        equal &= x.ct_eq(&y);
    }
    equal &= a.len().ct_eq(&b.len());
    equal.into()
}
