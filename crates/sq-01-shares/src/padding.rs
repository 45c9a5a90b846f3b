//! Padding shares.
//!
//! A padding share is a sequence-start share with a zero sequence length and
//! a zero-filled body. Only its namespace differs between the three kinds:
//!
//! | Kind | Namespace | Where |
//! |------|-----------|-------|
//! | Namespace padding | the preceding blob's | Between blobs, to reach an aligned start |
//! | Reserved padding | `PRIMARY_RESERVED_PADDING` | After the compact section |
//! | Tail padding | `TAIL_PADDING` | After the last blob, to fill the square |

use crate::share::{InfoByte, Share, SHARE_VERSION_ZERO};
use shared_types::{Namespace, PRIMARY_RESERVED_PADDING_NAMESPACE, TAIL_PADDING_NAMESPACE};

/// A single padding share in `namespace`.
pub fn padding_share(namespace: &Namespace) -> Share {
    let info = InfoByte(SHARE_VERSION_ZERO << 1 | 1);
    Share::compose(namespace, info, Some(0), None, None, &[])
}

/// `count` padding shares in a blob namespace.
pub fn namespace_padding_shares(namespace: &Namespace, count: usize) -> Vec<Share> {
    vec![padding_share(namespace); count]
}

/// `count` shares of primary reserved padding.
pub fn reserved_padding_shares(count: usize) -> Vec<Share> {
    namespace_padding_shares(&PRIMARY_RESERVED_PADDING_NAMESPACE, count)
}

/// `count` shares of tail padding.
pub fn tail_padding_shares(count: usize) -> Vec<Share> {
    namespace_padding_shares(&TAIL_PADDING_NAMESPACE, count)
}
