//! Unsigned LEB128 varints.

use crate::errors::ShareError;

const MAX_VARINT_LEN: usize = 10;

/// Appends `value` as an unsigned varint.
pub fn encode_uvarint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Encoded length of `value`.
pub fn uvarint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decodes a varint from the front of `buf`, returning the value and bytes read.
pub fn decode_uvarint(buf: &[u8]) -> Result<(u64, usize), ShareError> {
    let mut value = 0u64;
    for (i, byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        let low = u64::from(byte & 0x7F);
        if i == MAX_VARINT_LEN - 1 && *byte > 1 {
            return Err(ShareError::InvalidVarint);
        }
        value |= low << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(ShareError::InvalidVarint)
}
