//! Error types for the item directory.

use crate::mutation::OpKind;
use crate::status::Status;
use thiserror::Error;

/// Failure reported by the remote store client.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend rejected the operation: {0}")]
    Rejected(String),

    #[error("remote store disconnected")]
    Disconnected,
}

/// Per-record decode failure. The offending record is skipped; the rest of
/// the snapshot is unaffected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("field {0} has the wrong type")]
    WrongType(&'static str),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unknown status id: {0}")]
    UnknownStatus(i64),
}

/// Main error type for directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A required field was empty. Reported to the caller before any remote
    /// call is made.
    #[error("{0} is required")]
    MissingRequired(&'static str),

    /// Transport failure on the live feed or a one-shot read. The cache
    /// keeps its last good snapshot.
    #[error("subscription error: {0}")]
    Subscription(RemoteError),

    /// The backend rejected a write.
    #[error("mutation failed: {0}")]
    Mutation(RemoteError),

    /// A record could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The status is terminal or not a legal starting state.
    #[error("no valid transition from status {0}")]
    NoValidTransition(Status),

    /// A mutation of this kind is already in flight; the call was rejected,
    /// not queued.
    #[error("{0} operation already in flight")]
    InFlight(OpKind),

    /// The item has never been persisted, so it cannot be updated, moved
    /// through the lifecycle, or deleted.
    #[error("item has no id")]
    MissingId,

    /// The photo source could not be probed or re-encoded.
    #[error("photo processing failed: {0}")]
    Photo(String),
}

impl From<image::ImageError> for DirectoryError {
    fn from(e: image::ImageError) -> Self {
        DirectoryError::Photo(e.to_string())
    }
}

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;
