//! # Transaction Model and Wire Codec
//!
//! Raw transactions are opaque bytes on the wire. Each one starts with a
//! 4-byte type marker followed by a bincode body:
//!
//! ```text
//! "SQTX" || bincode(PlainTransaction)
//! "BLOB" || bincode(BlobTx)              BlobTx.tx = "SQTX" || bincode(PlainTransaction)
//! ```
//!
//! Decoding is bounded by the caller-supplied byte limit so that a hostile
//! length prefix can never allocate more than the transaction itself.

use crate::entities::{sha256, Address, Blob, Hash, Namespace};
use crate::errors::{DecodeError, EncodeError};
use bincode::Options;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// Type marker of a plain transaction.
pub const PLAIN_TX_MARKER: &[u8; 4] = b"SQTX";

/// Type marker of a blob transaction.
pub const BLOB_TX_MARKER: &[u8; 4] = b"BLOB";

/// A 32-byte validator public key inside a client header.
pub type ValidatorKey = [u8; 32];

/// A 64-byte commit signature inside a client header.
pub type CommitSignature = [u8; 64];

/// A state-transition transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainTransaction {
    /// Account paying fees and signing.
    pub signer: Address,
    /// Account sequence (replay protection).
    pub sequence: u64,
    /// Gas the signer is willing to spend.
    pub gas_limit: u64,
    /// Total fee offered.
    pub fee: u64,
    /// Free-form memo.
    pub memo: String,
    /// The single message carried by the transaction.
    pub message: Message,
}

/// Transaction messages understood by the cost model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Token transfer.
    Send {
        /// Recipient.
        to: Address,
        /// Amount in base units.
        amount: u64,
    },
    /// Light-client update carrying a foreign validator set.
    UpdateClient {
        /// Client being updated.
        client_id: String,
        /// Header to verify.
        header: ClientHeader,
    },
    /// Payment for blobs attached to the enclosing blob transaction.
    PayForBlobs(MsgPayForBlobs),
}

/// Header submitted by a light-client update.
///
/// Verification cost grows with the number of validators, which is why the
/// cost estimator charges per validator and caps the set size.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHeader {
    /// Foreign chain height.
    pub height: u64,
    /// Foreign validator set.
    pub validators: Vec<ValidatorKey>,
    /// Commit signatures over the header.
    #[serde_as(as = "Vec<Bytes>")]
    pub signatures: Vec<CommitSignature>,
}

/// Declares the blobs paid for by a blob transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgPayForBlobs {
    /// Account paying for the blobs.
    pub signer: Address,
    /// Namespace of each blob.
    pub namespaces: Vec<Namespace>,
    /// Byte length of each blob.
    pub blob_sizes: Vec<u32>,
    /// Share commitment of each blob.
    pub share_commitments: Vec<Hash>,
    /// Share version of each blob.
    pub share_versions: Vec<u8>,
}

/// A plain transaction wrapping a `MsgPayForBlobs`, plus the blobs it pays for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobTx {
    /// Encoded inner `PlainTransaction` (with its type marker).
    pub tx: Vec<u8>,
    /// Attached blobs.
    pub blobs: Vec<Blob>,
}

/// A decoded raw transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedTx {
    /// Ordinary state transition.
    Plain(PlainTransaction),
    /// Blob-carrying transaction.
    Blob {
        /// Decoded inner transaction (carries `PayForBlobs`).
        inner: PlainTransaction,
        /// Encoded inner transaction, as laid out in the square.
        inner_bytes: Vec<u8>,
        /// Attached blobs.
        blobs: Vec<Blob>,
    },
}

impl DecodedTx {
    /// The fee-paying transaction.
    pub fn tx(&self) -> &PlainTransaction {
        match self {
            Self::Plain(tx) => tx,
            Self::Blob { inner, .. } => inner,
        }
    }

    /// Attached blobs (empty for plain transactions).
    pub fn blobs(&self) -> &[Blob] {
        match self {
            Self::Plain(_) => &[],
            Self::Blob { blobs, .. } => blobs,
        }
    }

    /// True for blob transactions.
    pub fn is_blob_tx(&self) -> bool {
        matches!(self, Self::Blob { .. })
    }
}

fn codec(limit: u64) -> impl Options {
    bincode::DefaultOptions::new().with_limit(limit)
}

fn encode_with_marker<T: Serialize>(
    marker: &[u8; 4],
    value: &T,
) -> Result<Vec<u8>, EncodeError> {
    let mut out = marker.to_vec();
    bincode::DefaultOptions::new()
        .serialize_into(&mut out, value)
        .map_err(|e| EncodeError(e.to_string()))?;
    Ok(out)
}

impl PlainTransaction {
    /// Encodes the transaction with its type marker.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        encode_with_marker(PLAIN_TX_MARKER, self)
    }

    /// The `PayForBlobs` message, if this transaction carries one.
    pub fn pay_for_blobs(&self) -> Option<&MsgPayForBlobs> {
        match &self.message {
            Message::PayForBlobs(msg) => Some(msg),
            _ => None,
        }
    }
}

impl BlobTx {
    /// Wraps an inner transaction and its blobs.
    pub fn new(inner: &PlainTransaction, blobs: Vec<Blob>) -> Result<Self, EncodeError> {
        Ok(Self {
            tx: inner.encode()?,
            blobs,
        })
    }

    /// Encodes the blob transaction with its type marker.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        encode_with_marker(BLOB_TX_MARKER, self)
    }
}

fn decode_plain_body(body: &[u8], limit: u64) -> Result<PlainTransaction, DecodeError> {
    codec(limit)
        .deserialize(body)
        .map_err(|e| DecodeError::Body(e.to_string()))
}

/// Decodes a raw transaction.
///
/// # Errors
/// - `TooShort` / `UnknownMarker` for unrecognised framing
/// - `Body` for a body that does not decode within `limit` bytes
/// - `InnerNotPlain` / `MissingPayForBlobs` / `NoBlobs` for malformed blob txs
pub fn decode_transaction(raw: &[u8], limit: u64) -> Result<DecodedTx, DecodeError> {
    if raw.len() < PLAIN_TX_MARKER.len() {
        return Err(DecodeError::TooShort(raw.len()));
    }
    let (marker, body) = raw.split_at(PLAIN_TX_MARKER.len());

    if marker == PLAIN_TX_MARKER {
        return decode_plain_body(body, limit).map(DecodedTx::Plain);
    }
    if marker != BLOB_TX_MARKER {
        return Err(DecodeError::UnknownMarker(hex::encode(marker)));
    }

    let blob_tx: BlobTx = codec(limit)
        .deserialize(body)
        .map_err(|e| DecodeError::Body(e.to_string()))?;

    if blob_tx.tx.len() < PLAIN_TX_MARKER.len() || &blob_tx.tx[..4] != PLAIN_TX_MARKER {
        return Err(DecodeError::InnerNotPlain);
    }
    let inner = decode_plain_body(&blob_tx.tx[4..], limit)?;
    if inner.pay_for_blobs().is_none() {
        return Err(DecodeError::MissingPayForBlobs);
    }
    if blob_tx.blobs.is_empty() {
        return Err(DecodeError::NoBlobs);
    }

    Ok(DecodedTx::Blob {
        inner,
        inner_bytes: blob_tx.tx,
        blobs: blob_tx.blobs,
    })
}

/// Hash of a raw transaction (its identity in the pool).
pub fn tx_hash(raw: &[u8]) -> Hash {
    sha256(raw)
}
