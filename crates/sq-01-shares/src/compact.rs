//! Compact shares: length-prefixed units packed back to back.
//!
//! Plain transactions and the PayForBlobs wrappers are both written this way.
//! The whole namespace section is a single sequence whose length is the size
//! of the unit stream; each share's reserved field points at the first unit
//! that begins inside it so a reader can resynchronise mid-sequence.

use crate::errors::ShareError;
use crate::share::{
    InfoByte, Share, CONTINUATION_COMPACT_SHARE_CONTENT_SIZE, FIRST_COMPACT_SHARE_CONTENT_SIZE,
    SEQUENCE_LEN_BYTES, SHARE_INFO_BYTES, SHARE_RESERVED_BYTES, SHARE_SIZE, SHARE_VERSION_ZERO,
};
use crate::varint::{decode_uvarint, encode_uvarint, uvarint_len};
use shared_types::{Namespace, NAMESPACE_SIZE};

/// Number of compact shares needed for a unit stream of `sequence_len` bytes.
pub fn compact_shares_needed(sequence_len: usize) -> usize {
    if sequence_len == 0 {
        return 0;
    }
    if sequence_len <= FIRST_COMPACT_SHARE_CONTENT_SIZE {
        return 1;
    }
    let rest = sequence_len - FIRST_COMPACT_SHARE_CONTENT_SIZE;
    1 + rest.div_ceil(CONTINUATION_COMPACT_SHARE_CONTENT_SIZE)
}

/// Stream bytes taken by a unit of `len` bytes including its prefix.
pub fn delimited_len(len: usize) -> usize {
    uvarint_len(len as u64) + len
}

/// Splits units into the compact shares of one namespace.
#[derive(Debug, Clone)]
pub struct CompactShareSplitter {
    namespace: Namespace,
    stream: Vec<u8>,
    unit_starts: Vec<usize>,
}

impl CompactShareSplitter {
    /// Creates an empty splitter for `namespace`.
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            stream: Vec::new(),
            unit_starts: Vec::new(),
        }
    }

    /// Appends one unit.
    pub fn write_unit(&mut self, unit: &[u8]) {
        self.unit_starts.push(self.stream.len());
        encode_uvarint(unit.len() as u64, &mut self.stream);
        self.stream.extend_from_slice(unit);
    }

    /// Units written so far.
    pub fn unit_count(&self) -> usize {
        self.unit_starts.len()
    }

    /// Length of the unit stream.
    pub fn sequence_len(&self) -> usize {
        self.stream.len()
    }

    /// Shares `export` will produce.
    pub fn share_count(&self) -> usize {
        compact_shares_needed(self.stream.len())
    }

    /// Produces the shares. An empty splitter produces none.
    pub fn export(&self) -> Vec<Share> {
        let count = self.share_count();
        let mut shares = Vec::with_capacity(count);
        let sequence_len = self.stream.len() as u32;
        let mut pos = 0usize;
        let mut next_unit = 0usize;

        for i in 0..count {
            let first = i == 0;
            let capacity = if first {
                FIRST_COMPACT_SHARE_CONTENT_SIZE
            } else {
                CONTINUATION_COMPACT_SHARE_CONTENT_SIZE
            };
            let end = (pos + capacity).min(self.stream.len());

            while next_unit < self.unit_starts.len() && self.unit_starts[next_unit] < pos {
                next_unit += 1;
            }
            let header = SHARE_SIZE - capacity;
            let reserved = match self.unit_starts.get(next_unit) {
                Some(start) if *start < end => (header + start - pos) as u32,
                _ => 0,
            };

            let info = InfoByte(SHARE_VERSION_ZERO << 1 | u8::from(first));
            shares.push(Share::compose(
                &self.namespace,
                info,
                first.then_some(sequence_len),
                Some(reserved),
                None,
                &self.stream[pos..end],
            ));
            pos = end;
        }
        shares
    }
}

/// Reassembles the units of one compact sequence.
pub fn parse_compact_shares(shares: &[Share]) -> Result<Vec<Vec<u8>>, ShareError> {
    let Some(first) = shares.first() else {
        return Ok(Vec::new());
    };
    let namespace = first.namespace();
    let declared = first
        .sequence_len()
        .ok_or(ShareError::MissingSequenceStart)? as usize;

    let mut stream = Vec::with_capacity(declared);
    for (i, share) in shares.iter().enumerate() {
        if share.namespace() != namespace {
            return Err(ShareError::NamespaceMismatch {
                expected: namespace,
                found: share.namespace(),
            });
        }
        if i > 0 && share.is_sequence_start() {
            return Err(ShareError::UnexpectedSequenceStart(i));
        }
        stream.extend_from_slice(share.payload());
    }
    if stream.len() < declared {
        return Err(ShareError::TruncatedSequence {
            declared,
            available: stream.len(),
        });
    }
    stream.truncate(declared);

    let mut units = Vec::new();
    let mut cursor = 0usize;
    while cursor < stream.len() {
        let (len, read) = decode_uvarint(&stream[cursor..])?;
        cursor += read;
        let len = usize::try_from(len).map_err(|_| ShareError::InvalidVarint)?;
        let end = cursor
            .checked_add(len)
            .filter(|end| *end <= stream.len())
            .ok_or(ShareError::TruncatedSequence {
                declared: cursor.saturating_add(len),
                available: stream.len(),
            })?;
        units.push(stream[cursor..end].to_vec());
        cursor = end;
    }
    Ok(units)
}

/// Header bytes preceding the payload of a compact start share.
pub const COMPACT_START_HEADER_LEN: usize =
    NAMESPACE_SIZE + SHARE_INFO_BYTES + SEQUENCE_LEN_BYTES + SHARE_RESERVED_BYTES;
