//! Power-of-two arithmetic and blob alignment.
//!
//! A blob of `n` shares starts on a multiple of `round_up_power_of_two(n)`.
//! Its commitment is built over subtrees of width `subtree_width(n)`, which
//! is never larger than that alignment, so every such subtree is also a
//! subtree of the row tree and the commitment can be checked against row
//! roots without the rest of the row.

/// Smallest power of two `>= n` (1 for 0).
pub fn round_up_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Largest power of two `<= n`. `n` must be non-zero.
pub fn round_down_power_of_two(n: usize) -> usize {
    debug_assert!(n > 0);
    1 << (usize::BITS - 1 - n.leading_zeros())
}

/// Rounds `cursor` up to a multiple of `multiple`.
pub fn round_up_by(cursor: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return cursor;
    }
    cursor.div_ceil(multiple) * multiple
}

/// Smallest square dimension able to hold a blob of `share_count` shares in
/// one piece.
pub fn blob_min_square_size(share_count: usize) -> usize {
    round_up_power_of_two(ceil_sqrt(share_count))
}

/// Width of the subtrees a blob of `share_count` shares is committed over.
pub fn subtree_width(share_count: usize, subtree_root_threshold: usize) -> usize {
    let threshold = subtree_root_threshold.max(1);
    let by_threshold = round_up_power_of_two(share_count.div_ceil(threshold));
    by_threshold.min(blob_min_square_size(share_count))
}

/// First index at or after `cursor` where a blob of `share_count` shares may start.
pub fn next_share_index(cursor: usize, share_count: usize) -> usize {
    round_up_by(cursor, round_up_power_of_two(share_count))
}

fn ceil_sqrt(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while root * root < n {
        root += 1;
    }
    root
}
