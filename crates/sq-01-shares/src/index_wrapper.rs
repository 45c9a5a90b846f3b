//! The unit written to the PayForBlobs namespace.
//!
//! ```text
//! "INDX" ‖ uvarint(tx_len) ‖ tx ‖ uvarint(n) ‖ n × u32 BE share index
//! ```
//!
//! Share indexes have a fixed width so a wrapper's size is known before the
//! blobs it points at have been placed.

use crate::errors::ShareError;
use crate::varint::{decode_uvarint, encode_uvarint, uvarint_len};

/// Type marker of an index wrapper.
pub const INDEX_WRAPPER_MARKER: &[u8; 4] = b"INDX";

/// A blob transaction's inner tx plus the first share index of each blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexWrapper {
    /// Encoded inner transaction.
    pub tx: Vec<u8>,
    /// Index of each blob's first share in the square.
    pub share_indexes: Vec<u32>,
}

impl IndexWrapper {
    /// Encoded length of a wrapper around `tx_len` bytes with `blob_count` indexes.
    pub fn encoded_len(tx_len: usize, blob_count: usize) -> usize {
        INDEX_WRAPPER_MARKER.len()
            + uvarint_len(tx_len as u64)
            + tx_len
            + uvarint_len(blob_count as u64)
            + blob_count * 4
    }

    /// Encodes the wrapper.
    pub fn encode(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(Self::encoded_len(self.tx.len(), self.share_indexes.len()));
        out.extend_from_slice(INDEX_WRAPPER_MARKER);
        encode_uvarint(self.tx.len() as u64, &mut out);
        out.extend_from_slice(&self.tx);
        encode_uvarint(self.share_indexes.len() as u64, &mut out);
        for index in &self.share_indexes {
            out.extend_from_slice(&index.to_be_bytes());
        }
        out
    }

    /// Decodes a wrapper, rejecting trailing bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ShareError> {
        let body = bytes
            .strip_prefix(INDEX_WRAPPER_MARKER.as_slice())
            .ok_or(ShareError::InvalidIndexWrapper)?;

        let (tx_len, read) = decode_uvarint(body)?;
        let rest = &body[read..];
        let tx_len = usize::try_from(tx_len).map_err(|_| ShareError::InvalidIndexWrapper)?;
        if rest.len() < tx_len {
            return Err(ShareError::InvalidIndexWrapper);
        }
        let (tx, rest) = rest.split_at(tx_len);

        let (count, read) = decode_uvarint(rest)?;
        let rest = &rest[read..];
        let count = usize::try_from(count).map_err(|_| ShareError::InvalidIndexWrapper)?;
        if count.checked_mul(4) != Some(rest.len()) {
            return Err(ShareError::InvalidIndexWrapper);
        }
        let share_indexes = rest
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self {
            tx: tx.to_vec(),
            share_indexes,
        })
    }
}
