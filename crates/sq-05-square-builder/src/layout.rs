//! Two-pass square layout.
//!
//! ```text
//! ┌──────────┬──────────────┬──────────────────┬──────────────────────────┬──────────┐
//! │ TX       │ PAY_FOR_BLOB │ reserved padding │ blobs by namespace,      │ tail     │
//! │ compact  │ compact      │                  │ each pow2-aligned        │ padding  │
//! └──────────┴──────────────┴──────────────────┴──────────────────────────┴──────────┘
//! ```
//!
//! Pass one computes every section size and every blob start from lengths
//! alone. A blob of `n` shares starts on a multiple of the smallest power of
//! two `>= n`. Pass two writes the shares. Index wrappers carry fixed-width share
//! indexes, so filling them in during pass two cannot change a size fixed in
//! pass one.

use crate::errors::BuildError;
use shared_types::{DecodedTx, Namespace, ProtocolParams, PAY_FOR_BLOB_NAMESPACE, TX_NAMESPACE};
use sq_01_shares::{
    blob_min_square_size, compact_shares_needed, delimited_len, next_share_index,
    reserved_padding_shares, sparse_shares_needed, tail_padding_shares, CompactShareSplitter,
    IndexWrapper, Share, SparseShareSplitter, Square,
};
use std::ops::Range;

/// A transaction as it appears in a proposal.
#[derive(Clone, Copy, Debug)]
pub struct TxRef<'a> {
    /// Raw bytes.
    pub raw: &'a [u8],
    /// Decoded form.
    pub tx: &'a DecodedTx,
}

impl<'a> TxRef<'a> {
    /// Pairs raw bytes with their decoded form.
    pub fn new(raw: &'a [u8], tx: &'a DecodedTx) -> Self {
        Self { raw, tx }
    }
}

/// Where one blob landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobPlacement {
    /// Index of the owning transaction in the proposal.
    pub tx_index: usize,
    /// Index of the blob within its transaction.
    pub blob_index: usize,
    /// Blob namespace.
    pub namespace: Namespace,
    /// First share index.
    pub start: usize,
    /// Share count.
    pub len: usize,
}

impl BlobPlacement {
    /// Share index range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// A constructed square and the position of everything in it.
#[derive(Clone, Debug)]
pub struct SquareLayout {
    /// The square.
    pub square: Square,
    /// Shares of the TX namespace.
    pub tx_range: Range<usize>,
    /// Shares of the PAY_FOR_BLOB namespace.
    pub pfb_range: Range<usize>,
    /// Blob placements in square order.
    pub blobs: Vec<BlobPlacement>,
    /// Shares before tail padding.
    pub used_shares: usize,
}

impl SquareLayout {
    /// Square dimension.
    pub fn size(&self) -> usize {
        self.square.size()
    }
}

/// First share of each blob, in the given order, starting at `cursor`.
///
/// Returns the starts and the index just past the last blob.
pub fn blob_starts<I>(mut cursor: usize, share_counts: I) -> (Vec<usize>, usize)
where
    I: IntoIterator<Item = usize>,
{
    let mut starts = Vec::new();
    for count in share_counts {
        let start = next_share_index(cursor, count);
        starts.push(start);
        cursor = start + count;
    }
    (starts, cursor)
}

/// Smallest permitted dimension holding `used` shares.
pub fn square_size_for(used: usize, min_square_size: usize) -> usize {
    blob_min_square_size(used).max(min_square_size)
}

/// Result of pass one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutPlan {
    /// TX namespace share count.
    pub tx_shares: usize,
    /// PAY_FOR_BLOB namespace share count.
    pub pfb_shares: usize,
    /// Blob placements in square order.
    pub blobs: Vec<BlobPlacement>,
    /// Shares before tail padding.
    pub used_shares: usize,
    /// Square dimension.
    pub square_size: usize,
}

/// Pass one: sizes and positions only.
///
/// # Errors
/// - `PlainAfterBlob` if the list is not plain-then-blob ordered
/// - `SquareTooLarge` if the content overflows `params.max_square_size`
pub fn plan(txs: &[TxRef<'_>], params: &ProtocolParams) -> Result<LayoutPlan, BuildError> {
    let mut tx_stream = 0usize;
    let mut pfb_stream = 0usize;
    let mut entries: Vec<(Namespace, usize, usize, usize)> = Vec::new();
    let mut seen_blob_tx = false;

    for (tx_index, tx) in txs.iter().enumerate() {
        match tx.tx {
            DecodedTx::Plain(_) => {
                if seen_blob_tx {
                    return Err(BuildError::PlainAfterBlob { index: tx_index });
                }
                tx_stream += delimited_len(tx.raw.len());
            }
            DecodedTx::Blob {
                inner_bytes, blobs, ..
            } => {
                seen_blob_tx = true;
                pfb_stream += delimited_len(IndexWrapper::encoded_len(
                    inner_bytes.len(),
                    blobs.len(),
                ));
                for (blob_index, blob) in blobs.iter().enumerate() {
                    let len = sparse_shares_needed(blob.data.len(), blob.share_version);
                    entries.push((blob.namespace, tx_index, blob_index, len));
                }
            }
        }
    }

    // Stable: blobs sharing a namespace keep transaction order.
    entries.sort_by_key(|(namespace, ..)| *namespace);

    let tx_shares = compact_shares_needed(tx_stream);
    let pfb_shares = compact_shares_needed(pfb_stream);
    let (starts, used_shares) =
        blob_starts(tx_shares + pfb_shares, entries.iter().map(|(.., len)| *len));

    let square_size = square_size_for(used_shares, params.min_square_size);
    if square_size > params.max_square_size {
        let max = params.max_square_size;
        return Err(BuildError::SquareTooLarge {
            needed: used_shares,
            max,
            capacity: max * max,
        });
    }

    let blobs = entries
        .into_iter()
        .zip(starts)
        .map(
            |((namespace, tx_index, blob_index, len), start)| BlobPlacement {
                tx_index,
                blob_index,
                namespace,
                start,
                len,
            },
        )
        .collect();

    Ok(LayoutPlan {
        tx_shares,
        pfb_shares,
        blobs,
        used_shares,
        square_size,
    })
}

fn check_section(section: &'static str, planned: usize, actual: usize) -> Result<(), BuildError> {
    if planned != actual {
        return Err(BuildError::SectionSizeMismatch {
            section,
            planned,
            actual,
        });
    }
    Ok(())
}

impl LayoutPlan {
    /// Pass two: writes the shares the plan describes.
    ///
    /// `txs` must be the list the plan was computed from.
    pub fn place(self, txs: &[TxRef<'_>]) -> Result<SquareLayout, BuildError> {
        let mut share_indexes: Vec<Vec<u32>> = txs
            .iter()
            .map(|tx| vec![0u32; tx.tx.blobs().len()])
            .collect();
        for placement in &self.blobs {
            // Bounded by max_square_size², far below u32::MAX.
            share_indexes[placement.tx_index][placement.blob_index] = placement.start as u32;
        }

        let mut tx_splitter = CompactShareSplitter::new(TX_NAMESPACE);
        let mut pfb_splitter = CompactShareSplitter::new(PAY_FOR_BLOB_NAMESPACE);
        for (tx_index, tx) in txs.iter().enumerate() {
            match tx.tx {
                DecodedTx::Plain(_) => tx_splitter.write_unit(tx.raw),
                DecodedTx::Blob { inner_bytes, .. } => {
                    let wrapper = IndexWrapper {
                        tx: inner_bytes.clone(),
                        share_indexes: std::mem::take(&mut share_indexes[tx_index]),
                    };
                    pfb_splitter.write_unit(&wrapper.encode());
                }
            }
        }
        check_section("TX", self.tx_shares, tx_splitter.share_count())?;
        check_section("PAY_FOR_BLOB", self.pfb_shares, pfb_splitter.share_count())?;

        let total = self.square_size * self.square_size;
        let mut shares: Vec<Share> = Vec::with_capacity(total);
        shares.extend(tx_splitter.export());
        shares.extend(pfb_splitter.export());
        let reserved_end = shares.len();

        let mut sparse = SparseShareSplitter::new();
        let mut previous: Option<Namespace> = None;
        for placement in &self.blobs {
            let cursor = reserved_end + sparse.count();
            let gap = placement.start - cursor;
            match previous {
                None => shares.extend(reserved_padding_shares(gap)),
                Some(namespace) => sparse.write_namespace_padding(&namespace, gap),
            }
            let blob = &txs[placement.tx_index].tx.blobs()[placement.blob_index];
            sparse.write(blob)?;
            previous = Some(placement.namespace);
        }
        shares.extend(sparse.export());
        check_section("blob", self.used_shares, shares.len())?;

        shares.extend(tail_padding_shares(total - shares.len()));
        let square = Square::new(shares)?;

        Ok(SquareLayout {
            square,
            tx_range: 0..self.tx_shares,
            pfb_range: self.tx_shares..self.tx_shares + self.pfb_shares,
            blobs: self.blobs,
            used_shares: self.used_shares,
        })
    }
}

/// Lays out an already ordered transaction list.
///
/// This is the deterministic half of building: the same list and parameters
/// always produce the same square.
pub fn construct(txs: &[TxRef<'_>], params: &ProtocolParams) -> Result<SquareLayout, BuildError> {
    plan(txs, params)?.place(txs)
}
