//! Variable-length integers.
//!
//! Both widths use unsigned LEB128: seven payload bits per byte, low group
//! first, high bit set on every byte except the last. Only the minimal
//! encoding of a value is accepted when decoding, so every integer has exactly
//! one byte representation.

use num_bigint::BigUint;

use crate::error::CodecError;

/// Maximum encoded length of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Append the LEB128 encoding of `n`.
pub fn encode_varint(buf: &mut Vec<u8>, mut n: u64) {
    loop {
        let byte = (n & 0x7f) as u8;
        n >>= 7;
        if n == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Length in bytes of the encoding of `n`.
pub fn varint_len(n: u64) -> usize {
    let bits = 64 - n.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decode a `u64`, returning the value and the number of bytes consumed.
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize), CodecError> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(CodecError::VarIntOverflow);
        }
        let group = u64::from(byte & 0x7f);
        // The tenth byte only has room for the top bit of a u64.
        if i == MAX_VARINT_LEN - 1 && group > 1 {
            return Err(CodecError::VarIntOverflow);
        }
        value |= group << (7 * i);
        if byte & 0x80 == 0 {
            if byte == 0 && i > 0 {
                return Err(CodecError::NonCanonical("varint has trailing zero group".into()));
            }
            return Ok((value, i + 1));
        }
    }
    Err(CodecError::TruncatedInput {
        needed: bytes.len() + 1,
        available: bytes.len(),
    })
}

/// Append the LEB128 encoding of an arbitrary-precision integer.
pub fn encode_varbigint(buf: &mut Vec<u8>, n: &BigUint) {
    // to_radix_le yields [0] for zero, so there is always at least one group.
    let groups = n.to_radix_le(128);
    let last = groups.len() - 1;
    for (i, group) in groups.into_iter().enumerate() {
        if i == last {
            buf.push(group);
        } else {
            buf.push(group | 0x80);
        }
    }
}

/// Decode an arbitrary-precision integer, returning it and the bytes consumed.
pub fn decode_varbigint(bytes: &[u8]) -> Result<(BigUint, usize), CodecError> {
    let mut groups = Vec::new();
    for (i, &byte) in bytes.iter().enumerate() {
        groups.push(byte & 0x7f);
        if byte & 0x80 == 0 {
            if byte == 0 && i > 0 {
                return Err(CodecError::NonCanonical(
                    "varbigint has trailing zero group".into(),
                ));
            }
            let value = BigUint::from_radix_le(&groups, 128)
                .ok_or_else(|| CodecError::Malformed("invalid varbigint digits".into()))?;
            return Ok((value, i + 1));
        }
    }
    Err(CodecError::TruncatedInput {
        needed: bytes.len() + 1,
        available: bytes.len(),
    })
}
