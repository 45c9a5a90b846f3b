//! Sparse shares: one blob per sequence, raw bytes, no unit framing.

use crate::errors::ShareError;
use crate::padding::namespace_padding_shares;
use crate::share::{
    ensure_supported_version, InfoByte, Share, CONTINUATION_SPARSE_SHARE_CONTENT_SIZE,
    FIRST_SPARSE_SHARE_CONTENT_SIZE, SHARE_VERSION_ONE, SIGNER_SIZE,
};
use shared_types::{Blob, Namespace};

fn first_share_capacity(share_version: u8) -> usize {
    if share_version == SHARE_VERSION_ONE {
        FIRST_SPARSE_SHARE_CONTENT_SIZE - SIGNER_SIZE
    } else {
        FIRST_SPARSE_SHARE_CONTENT_SIZE
    }
}

/// Number of shares a blob of `len` bytes occupies.
pub fn sparse_shares_needed(len: usize, share_version: u8) -> usize {
    if len == 0 {
        return 0;
    }
    let first = first_share_capacity(share_version);
    if len <= first {
        return 1;
    }
    1 + (len - first).div_ceil(CONTINUATION_SPARSE_SHARE_CONTENT_SIZE)
}

/// Splits a single blob into its shares.
///
/// # Errors
/// - `EmptyBlob` for a blob without data
/// - `UnsupportedShareVersion` / `MissingSigner` for an invalid share version
/// - `BlobTooLarge` when the length does not fit a sequence length
pub fn blob_shares(blob: &Blob) -> Result<Vec<Share>, ShareError> {
    ensure_supported_version(blob.share_version)?;
    if blob.data.is_empty() {
        return Err(ShareError::EmptyBlob);
    }
    let sequence_len =
        u32::try_from(blob.data.len()).map_err(|_| ShareError::BlobTooLarge(blob.data.len()))?;
    let signer = if blob.share_version == SHARE_VERSION_ONE {
        Some(blob.signer.ok_or(ShareError::MissingSigner)?)
    } else {
        None
    };

    let count = sparse_shares_needed(blob.data.len(), blob.share_version);
    let mut shares = Vec::with_capacity(count);
    let first_cap = first_share_capacity(blob.share_version);
    let split = first_cap.min(blob.data.len());

    let info = InfoByte::new(blob.share_version, true)?;
    shares.push(Share::compose(
        &blob.namespace,
        info,
        Some(sequence_len),
        None,
        signer.as_ref(),
        &blob.data[..split],
    ));

    let info = InfoByte::new(blob.share_version, false)?;
    for chunk in blob.data[split..].chunks(CONTINUATION_SPARSE_SHARE_CONTENT_SIZE) {
        shares.push(Share::compose(&blob.namespace, info, None, None, None, chunk));
    }
    Ok(shares)
}

/// Accumulates blobs and namespace padding into a run of sparse shares.
#[derive(Debug, Clone, Default)]
pub struct SparseShareSplitter {
    shares: Vec<Share>,
}

impl SparseShareSplitter {
    /// Creates an empty splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the shares of one blob.
    pub fn write(&mut self, blob: &Blob) -> Result<(), ShareError> {
        let shares = blob_shares(blob)?;
        self.shares.extend(shares);
        Ok(())
    }

    /// Appends `count` padding shares in `namespace`.
    pub fn write_namespace_padding(&mut self, namespace: &Namespace, count: usize) {
        self.shares
            .extend(namespace_padding_shares(namespace, count));
    }

    /// Shares written so far.
    pub fn count(&self) -> usize {
        self.shares.len()
    }

    /// Consumes the splitter.
    pub fn export(self) -> Vec<Share> {
        self.shares
    }
}

/// Recovers the blobs from a run of sparse shares, skipping padding.
pub fn parse_sparse_shares(shares: &[Share]) -> Result<Vec<Blob>, ShareError> {
    let mut blobs = Vec::new();
    let mut i = 0usize;

    while i < shares.len() {
        let start = &shares[i];
        if start.is_padding() {
            i += 1;
            continue;
        }
        let declared = start
            .sequence_len()
            .ok_or(ShareError::MissingSequenceStart)? as usize;
        let info = start.info();
        ensure_supported_version(info.version())?;
        let namespace = start.namespace();

        let needed = sparse_shares_needed(declared, info.version());
        let end = i + needed;
        if end > shares.len() {
            return Err(ShareError::TruncatedSequence {
                declared,
                available: shares.len() - i,
            });
        }

        let mut data = Vec::with_capacity(declared);
        for (offset, share) in shares[i..end].iter().enumerate() {
            if share.namespace() != namespace {
                return Err(ShareError::NamespaceMismatch {
                    expected: namespace,
                    found: share.namespace(),
                });
            }
            if offset > 0 && share.is_sequence_start() {
                return Err(ShareError::UnexpectedSequenceStart(i + offset));
            }
            data.extend_from_slice(share.payload());
        }
        data.truncate(declared);

        blobs.push(Blob {
            namespace,
            data,
            share_version: info.version(),
            signer: start.signer(),
        });
        i = end;
    }
    Ok(blobs)
}
