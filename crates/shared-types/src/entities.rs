//! # Core Domain Entities
//!
//! Hashes, account addresses, namespaces and blobs.
//!
//! ## Namespaces
//!
//! A namespace is 29 bytes: a version byte followed by a 28-byte id. The
//! derived `Ord` is plain lexicographic byte order, which is the order used
//! both for laying out blobs and for the namespaced Merkle tree.
//!
//! | Namespace | Bytes | Use |
//! |-----------|-------|-----|
//! | `TX_NAMESPACE` | `00 00..00 01` | Plain transactions (compact shares) |
//! | `PAY_FOR_BLOB_NAMESPACE` | `00 00..00 04` | Blob tx wrappers (compact shares) |
//! | `PRIMARY_RESERVED_PADDING_NAMESPACE` | `00 00..00 FF` | Padding after the reserved section |
//! | `TAIL_PADDING_NAMESPACE` | `FF FF..FF FE` | Padding at the end of the square |
//! | `PARITY_NAMESPACE` | `FF FF..FF FF` | Never carries data |

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// A 20-byte account address.
pub type Address = [u8; 20];

/// Size of the namespace version prefix.
pub const NAMESPACE_VERSION_SIZE: usize = 1;

/// Size of the namespace id.
pub const NAMESPACE_ID_SIZE: usize = 28;

/// Total namespace size.
pub const NAMESPACE_SIZE: usize = NAMESPACE_VERSION_SIZE + NAMESPACE_ID_SIZE;

/// Number of leading zero id bytes required by version-0 namespaces.
pub const NAMESPACE_V0_PREFIX_ZEROS: usize = 18;

/// Maximum user-chosen id bytes in a version-0 namespace.
pub const NAMESPACE_V0_SUB_ID_SIZE: usize = NAMESPACE_ID_SIZE - NAMESPACE_V0_PREFIX_ZEROS;

/// Compute SHA-256 of data.
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// A share namespace (version byte + 28-byte id).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Namespace([u8; NAMESPACE_SIZE]);

impl Namespace {
    /// Builds a namespace from its raw 29 bytes.
    pub const fn from_raw(bytes: [u8; NAMESPACE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a namespace from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; NAMESPACE_SIZE] = bytes.try_into().ok()?;
        Some(Self(raw))
    }

    /// Builds a version-0 namespace from up to 10 user id bytes.
    ///
    /// The sub id is right-aligned; the id is left-padded with zeros.
    pub fn v0(sub_id: &[u8]) -> Option<Self> {
        if sub_id.len() > NAMESPACE_V0_SUB_ID_SIZE {
            return None;
        }
        let mut raw = [0u8; NAMESPACE_SIZE];
        let start = NAMESPACE_SIZE - sub_id.len();
        raw[start..].copy_from_slice(sub_id);
        Some(Self(raw))
    }

    /// Raw namespace bytes.
    pub fn as_bytes(&self) -> &[u8; NAMESPACE_SIZE] {
        &self.0
    }

    /// Namespace version byte.
    pub fn version(&self) -> u8 {
        self.0[0]
    }

    /// Namespace id (28 bytes).
    pub fn id(&self) -> &[u8] {
        &self.0[NAMESPACE_VERSION_SIZE..]
    }

    /// True for namespaces at or below the primary reserved padding namespace.
    pub fn is_primary_reserved(&self) -> bool {
        *self <= PRIMARY_RESERVED_PADDING_NAMESPACE
    }

    /// True for the tail padding and parity namespaces.
    pub fn is_secondary_reserved(&self) -> bool {
        *self >= TAIL_PADDING_NAMESPACE
    }

    /// True if blobs may not use this namespace.
    pub fn is_reserved(&self) -> bool {
        self.is_primary_reserved() || self.is_secondary_reserved()
    }

    /// Checks that a namespace may carry user blobs.
    pub fn validate_for_blob(&self) -> Result<(), NamespaceError> {
        if self.is_reserved() {
            return Err(NamespaceError::Reserved(*self));
        }
        match self.version() {
            0 => {
                let prefix = &self.id()[..NAMESPACE_V0_PREFIX_ZEROS];
                if prefix.iter().any(|b| *b != 0) {
                    return Err(NamespaceError::InvalidV0Prefix(*self));
                }
                Ok(())
            }
            v => Err(NamespaceError::UnsupportedVersion(v)),
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", hex::encode(self.0))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

const fn primary_reserved(last: u8) -> Namespace {
    let mut raw = [0u8; NAMESPACE_SIZE];
    raw[NAMESPACE_SIZE - 1] = last;
    Namespace::from_raw(raw)
}

const fn secondary_reserved(last: u8) -> Namespace {
    let mut raw = [0xFFu8; NAMESPACE_SIZE];
    raw[NAMESPACE_SIZE - 1] = last;
    Namespace::from_raw(raw)
}

/// Namespace of plain transactions.
pub const TX_NAMESPACE: Namespace = primary_reserved(0x01);

/// Namespace of blob transaction wrappers.
pub const PAY_FOR_BLOB_NAMESPACE: Namespace = primary_reserved(0x04);

/// Padding between the reserved section and the first blob.
pub const PRIMARY_RESERVED_PADDING_NAMESPACE: Namespace = primary_reserved(0xFF);

/// Padding at the end of the square.
pub const TAIL_PADDING_NAMESPACE: Namespace = secondary_reserved(0xFE);

/// Highest namespace; reserved for parity data.
pub const PARITY_NAMESPACE: Namespace = secondary_reserved(0xFF);

/// Namespace validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamespaceError {
    /// Blob uses a reserved namespace.
    #[error("namespace {0} is reserved")]
    Reserved(Namespace),

    /// Version-0 namespace without the required zero prefix.
    #[error("namespace {0} lacks the version-0 zero prefix")]
    InvalidV0Prefix(Namespace),

    /// Unknown namespace version.
    #[error("unsupported namespace version {0}")]
    UnsupportedVersion(u8),
}

/// A namespaced blob carried by a blob transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Namespace the blob is published under.
    pub namespace: Namespace,
    /// Blob payload.
    pub data: Vec<u8>,
    /// Share format version (0 = no signer, 1 = signer embedded).
    pub share_version: u8,
    /// Signer embedded in the first share (share version 1 only).
    pub signer: Option<Address>,
}

impl Blob {
    /// Creates a share-version-0 blob.
    pub fn new(namespace: Namespace, data: Vec<u8>) -> Self {
        Self {
            namespace,
            data,
            share_version: 0,
            signer: None,
        }
    }

    /// Creates a share-version-1 blob that records its signer.
    pub fn with_signer(namespace: Namespace, data: Vec<u8>, signer: Address) -> Self {
        Self {
            namespace,
            data,
            share_version: 1,
            signer: Some(signer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_namespace_ordering() {
        assert!(TX_NAMESPACE < PAY_FOR_BLOB_NAMESPACE);
        assert!(PAY_FOR_BLOB_NAMESPACE < PRIMARY_RESERVED_PADDING_NAMESPACE);
        assert!(PRIMARY_RESERVED_PADDING_NAMESPACE < TAIL_PADDING_NAMESPACE);
        assert!(TAIL_PADDING_NAMESPACE < PARITY_NAMESPACE);
    }

    #[test]
    fn test_v0_namespace_is_usable() {
        let ns = Namespace::v0(b"rollup-a").unwrap();
        assert_eq!(ns.version(), 0);
        assert!(ns.validate_for_blob().is_ok());
        assert!(ns > PRIMARY_RESERVED_PADDING_NAMESPACE);
    }

    #[test]
    fn test_v0_sub_id_too_long() {
        assert!(Namespace::v0(&[1u8; 11]).is_none());
    }

    #[test]
    fn test_reserved_namespaces_rejected_for_blobs() {
        assert_eq!(
            TX_NAMESPACE.validate_for_blob(),
            Err(NamespaceError::Reserved(TX_NAMESPACE))
        );
        assert!(TAIL_PADDING_NAMESPACE.validate_for_blob().is_err());
    }

    #[test]
    fn test_v0_prefix_enforced() {
        let mut raw = [0u8; NAMESPACE_SIZE];
        raw[3] = 1;
        raw[NAMESPACE_SIZE - 1] = 9;
        let ns = Namespace::from_raw(raw);
        assert_eq!(
            ns.validate_for_blob(),
            Err(NamespaceError::InvalidV0Prefix(ns))
        );
    }
}
