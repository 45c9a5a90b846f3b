//! The data square.

use crate::errors::ShareError;
use crate::padding::tail_padding_shares;
use crate::share::Share;
use shared_types::Namespace;
use std::ops::Range;

/// A `size × size` matrix of shares stored row-major.
///
/// `size` is always a power of two and `shares.len() == size * size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Square {
    size: usize,
    shares: Vec<Share>,
}

impl Square {
    /// Arranges `shares` row-major into a square.
    ///
    /// # Errors
    /// `NotSquare` unless the count is the square of a power of two.
    pub fn new(shares: Vec<Share>) -> Result<Self, ShareError> {
        let count = shares.len();
        let size = (count as f64).sqrt().round() as usize;
        if count == 0 || size * size != count || !size.is_power_of_two() {
            return Err(ShareError::NotSquare(count));
        }
        Ok(Self { size, shares })
    }

    /// An all-padding square of dimension `size`.
    pub fn empty(size: usize) -> Result<Self, ShareError> {
        Self::new(tail_padding_shares(size.saturating_mul(size)))
    }

    /// Dimension (shares per row).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total shares (`size²`).
    pub fn share_count(&self) -> usize {
        self.shares.len()
    }

    /// All shares, row-major.
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    /// Share at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Option<&Share> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.shares.get(row * self.size + col)
    }

    /// Shares of row `row`.
    pub fn row(&self, row: usize) -> Option<&[Share]> {
        let start = row.checked_mul(self.size)?;
        self.shares.get(start..start + self.size)
    }

    /// Rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[Share]> {
        self.shares.chunks(self.size)
    }

    /// Shares of column `col`, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &Share> {
        let take = if col < self.size { self.size } else { 0 };
        self.shares.iter().skip(col).step_by(self.size).take(take)
    }

    /// Index range covered by `namespace`, if present.
    ///
    /// Shares are namespace-ordered, so the range is contiguous.
    pub fn namespace_range(&self, namespace: &Namespace) -> Option<Range<usize>> {
        let start = self
            .shares
            .iter()
            .position(|share| share.namespace() == *namespace)?;
        let len = self.shares[start..]
            .iter()
            .take_while(|share| share.namespace() == *namespace)
            .count();
        Some(start..start + len)
    }

    /// Number of non-padding shares.
    pub fn used_shares(&self) -> usize {
        self.shares.iter().filter(|share| !share.is_padding()).count()
    }

    /// Consumes the square.
    pub fn into_shares(self) -> Vec<Share> {
        self.shares
    }
}
