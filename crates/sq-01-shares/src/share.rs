//! The fixed-size share.

use crate::errors::ShareError;
use shared_types::{Address, Namespace, NAMESPACE_SIZE, PAY_FOR_BLOB_NAMESPACE, TX_NAMESPACE};
use std::fmt;

/// Size of every share in bytes.
pub const SHARE_SIZE: usize = 512;

/// Size of the info byte.
pub const SHARE_INFO_BYTES: usize = 1;

/// Size of the sequence length on sequence-start shares.
pub const SEQUENCE_LEN_BYTES: usize = 4;

/// Size of the reserved field on compact shares.
pub const SHARE_RESERVED_BYTES: usize = 4;

/// Size of the signer on share-version-1 start shares.
pub const SIGNER_SIZE: usize = 20;

/// Share version without an embedded signer.
pub const SHARE_VERSION_ZERO: u8 = 0;

/// Share version that embeds the blob signer.
pub const SHARE_VERSION_ONE: u8 = 1;

/// Largest share version the info byte can hold.
pub const MAX_SHARE_VERSION: u8 = 127;

/// Payload capacity of the first compact share of a sequence.
pub const FIRST_COMPACT_SHARE_CONTENT_SIZE: usize =
    SHARE_SIZE - NAMESPACE_SIZE - SHARE_INFO_BYTES - SEQUENCE_LEN_BYTES - SHARE_RESERVED_BYTES;

/// Payload capacity of a continuation compact share.
pub const CONTINUATION_COMPACT_SHARE_CONTENT_SIZE: usize =
    SHARE_SIZE - NAMESPACE_SIZE - SHARE_INFO_BYTES - SHARE_RESERVED_BYTES;

/// Payload capacity of the first sparse share of a share-version-0 blob.
pub const FIRST_SPARSE_SHARE_CONTENT_SIZE: usize =
    SHARE_SIZE - NAMESPACE_SIZE - SHARE_INFO_BYTES - SEQUENCE_LEN_BYTES;

/// Payload capacity of a continuation sparse share.
pub const CONTINUATION_SPARSE_SHARE_CONTENT_SIZE: usize =
    SHARE_SIZE - NAMESPACE_SIZE - SHARE_INFO_BYTES;

/// The info byte: share version and sequence-start flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfoByte(pub(crate) u8);

impl InfoByte {
    /// Builds an info byte.
    pub fn new(share_version: u8, sequence_start: bool) -> Result<Self, ShareError> {
        if share_version > MAX_SHARE_VERSION {
            return Err(ShareError::UnsupportedShareVersion(share_version));
        }
        Ok(Self(share_version << 1 | u8::from(sequence_start)))
    }

    /// Share version.
    pub fn version(self) -> u8 {
        self.0 >> 1
    }

    /// True on the first share of a sequence.
    pub fn is_sequence_start(self) -> bool {
        self.0 & 1 == 1
    }

    /// Raw byte.
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

/// Checks that a share version is understood by this node.
pub fn ensure_supported_version(share_version: u8) -> Result<(), ShareError> {
    match share_version {
        SHARE_VERSION_ZERO | SHARE_VERSION_ONE => Ok(()),
        v => Err(ShareError::UnsupportedShareVersion(v)),
    }
}

/// True for namespaces laid out as compact shares.
pub fn is_compact_namespace(namespace: &Namespace) -> bool {
    *namespace == TX_NAMESPACE || *namespace == PAY_FOR_BLOB_NAMESPACE
}

/// A 512-byte share.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Share([u8; SHARE_SIZE]);

impl Share {
    /// Parses a raw share.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ShareError> {
        let raw: [u8; SHARE_SIZE] = bytes
            .try_into()
            .map_err(|_| ShareError::InvalidSize(bytes.len()))?;
        Ok(Self(raw))
    }

    /// Writes the header fields and as much of `content` as fits.
    ///
    /// Callers size `content` from the capacity constants above.
    pub(crate) fn compose(
        namespace: &Namespace,
        info: InfoByte,
        sequence_len: Option<u32>,
        reserved: Option<u32>,
        signer: Option<&Address>,
        content: &[u8],
    ) -> Self {
        let mut raw = [0u8; SHARE_SIZE];
        raw[..NAMESPACE_SIZE].copy_from_slice(namespace.as_bytes());
        let mut at = NAMESPACE_SIZE;
        raw[at] = info.as_u8();
        at += SHARE_INFO_BYTES;

        if let Some(len) = sequence_len {
            raw[at..at + SEQUENCE_LEN_BYTES].copy_from_slice(&len.to_be_bytes());
            at += SEQUENCE_LEN_BYTES;
        }
        if let Some(offset) = reserved {
            raw[at..at + SHARE_RESERVED_BYTES].copy_from_slice(&offset.to_be_bytes());
            at += SHARE_RESERVED_BYTES;
        }
        if let Some(signer) = signer {
            raw[at..at + SIGNER_SIZE].copy_from_slice(signer);
            at += SIGNER_SIZE;
        }

        let take = content.len().min(SHARE_SIZE - at);
        raw[at..at + take].copy_from_slice(&content[..take]);
        Self(raw)
    }

    /// Raw share bytes.
    pub fn as_bytes(&self) -> &[u8; SHARE_SIZE] {
        &self.0
    }

    /// Namespace prefix.
    pub fn namespace(&self) -> Namespace {
        let mut raw = [0u8; NAMESPACE_SIZE];
        raw.copy_from_slice(&self.0[..NAMESPACE_SIZE]);
        Namespace::from_raw(raw)
    }

    /// Info byte.
    pub fn info(&self) -> InfoByte {
        InfoByte(self.0[NAMESPACE_SIZE])
    }

    /// True on the first share of a sequence.
    pub fn is_sequence_start(&self) -> bool {
        self.info().is_sequence_start()
    }

    /// Declared sequence length, present on sequence-start shares only.
    pub fn sequence_len(&self) -> Option<u32> {
        if !self.is_sequence_start() {
            return None;
        }
        let at = NAMESPACE_SIZE + SHARE_INFO_BYTES;
        let mut len = [0u8; SEQUENCE_LEN_BYTES];
        len.copy_from_slice(&self.0[at..at + SEQUENCE_LEN_BYTES]);
        Some(u32::from_be_bytes(len))
    }

    /// True for compact (transaction) shares.
    pub fn is_compact(&self) -> bool {
        is_compact_namespace(&self.namespace())
    }

    /// True for padding shares of any kind.
    pub fn is_padding(&self) -> bool {
        self.sequence_len() == Some(0)
    }

    fn header_len(&self) -> usize {
        let mut len = NAMESPACE_SIZE + SHARE_INFO_BYTES;
        if self.is_sequence_start() {
            len += SEQUENCE_LEN_BYTES;
        }
        if self.is_compact() {
            len += SHARE_RESERVED_BYTES;
        } else if self.is_sequence_start()
            && !self.is_padding()
            && self.info().version() == SHARE_VERSION_ONE
        {
            len += SIGNER_SIZE;
        }
        len
    }

    /// Reserved field of a compact share: offset of the first unit starting here.
    pub fn reserved(&self) -> Option<u32> {
        if !self.is_compact() {
            return None;
        }
        let at = self.header_len() - SHARE_RESERVED_BYTES;
        let mut offset = [0u8; SHARE_RESERVED_BYTES];
        offset.copy_from_slice(&self.0[at..at + SHARE_RESERVED_BYTES]);
        Some(u32::from_be_bytes(offset))
    }

    /// Signer embedded in the first share of a share-version-1 blob.
    pub fn signer(&self) -> Option<Address> {
        if self.is_compact()
            || !self.is_sequence_start()
            || self.is_padding()
            || self.info().version() != SHARE_VERSION_ONE
        {
            return None;
        }
        let at = self.header_len() - SIGNER_SIZE;
        let mut signer = [0u8; SIGNER_SIZE];
        signer.copy_from_slice(&self.0[at..at + SIGNER_SIZE]);
        Some(signer)
    }

    /// Bytes following every header field.
    pub fn payload(&self) -> &[u8] {
        &self.0[self.header_len()..]
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("namespace", &self.namespace())
            .field("version", &self.info().version())
            .field("start", &self.is_sequence_start())
            .field("sequence_len", &self.sequence_len())
            .finish()
    }
}

impl AsRef<[u8]> for Share {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacities() {
        assert_eq!(FIRST_COMPACT_SHARE_CONTENT_SIZE, 474);
        assert_eq!(CONTINUATION_COMPACT_SHARE_CONTENT_SIZE, 478);
        assert_eq!(FIRST_SPARSE_SHARE_CONTENT_SIZE, 478);
        assert_eq!(CONTINUATION_SPARSE_SHARE_CONTENT_SIZE, 482);
    }

    #[test]
    fn test_info_byte() {
        let info = InfoByte::new(1, true).unwrap();
        assert_eq!(info.as_u8(), 0b11);
        assert_eq!(info.version(), 1);
        assert!(info.is_sequence_start());
        assert!(InfoByte::new(128, false).is_err());
    }

    #[test]
    fn test_compose_compact_start_share() {
        let info = InfoByte::new(0, true).unwrap();
        let share = Share::compose(&TX_NAMESPACE, info, Some(10), Some(38), None, &[7u8; 10]);

        assert_eq!(share.namespace(), TX_NAMESPACE);
        assert_eq!(share.sequence_len(), Some(10));
        assert_eq!(share.reserved(), Some(38));
        assert_eq!(&share.payload()[..10], &[7u8; 10]);
        assert_eq!(share.payload().len(), FIRST_COMPACT_SHARE_CONTENT_SIZE);
    }

    #[test]
    fn test_signer_only_on_v1_sparse_start() {
        let ns = Namespace::v0(b"blob").unwrap();
        let info = InfoByte::new(1, true).unwrap();
        let share = Share::compose(&ns, info, Some(3), None, Some(&[9u8; 20]), &[1, 2, 3]);

        assert_eq!(share.signer(), Some([9u8; 20]));
        assert_eq!(&share.payload()[..3], &[1, 2, 3]);
        assert_eq!(share.reserved(), None);
    }

    #[test]
    fn test_from_bytes_checks_length() {
        assert_eq!(Share::from_bytes(&[0u8; 10]), Err(ShareError::InvalidSize(10)));
        assert!(Share::from_bytes(&[0u8; SHARE_SIZE]).is_ok());
    }
}
