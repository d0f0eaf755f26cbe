//! Channel-delivered handles for remote store results.

use crate::error::RemoteError;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::fmt;
use std::time::Duration;

/// Raw attribute bag of one record, as the backend stores it.
pub type RawAttrs = serde_json::Map<String, serde_json::Value>;

/// Result type for remote store operations.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Unique identifier for a live feed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedId(pub u64);

impl fmt::Debug for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedId({})", self.0)
    }
}

/// Events emitted by a collection feed.
#[derive(Clone, Debug)]
pub enum FeedEvent {
    /// One complete replacement delivery of the collection, keyed records in
    /// backend arrival order.
    Snapshot(Vec<(String, RawAttrs)>),

    /// Transport failure on the live feed.
    Error(RemoteError),
}

/// Handle to a live collection feed.
pub struct FeedHandle {
    pub id: FeedId,
    /// Channel to receive feed events.
    pub receiver: Receiver<FeedEvent>,
}

impl FeedHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<FeedEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<FeedEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<FeedEvent, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Pending acknowledgement of a single write, patch, or delete.
///
/// The backend resolves it exactly once, or never. `recv_timeout` is the
/// caller's bounded wait.
pub struct AckHandle {
    receiver: Receiver<RemoteResult<()>>,
}

impl AckHandle {
    /// Create a sender/handle pair for one pending acknowledgement.
    pub fn pair() -> (Sender<RemoteResult<()>>, AckHandle) {
        let (sender, receiver) = bounded(1);
        (sender, AckHandle { receiver })
    }

    /// A handle that is already resolved.
    pub fn resolved(result: RemoteResult<()>) -> AckHandle {
        let (sender, handle) = Self::pair();
        let _ = sender.send(result);
        handle
    }

    /// Wait for the acknowledgement (blocking).
    pub fn recv(&self) -> RemoteResult<()> {
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Disconnected),
        }
    }

    /// Wait for the acknowledgement, at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<RemoteResult<()>, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Pending result of a one-shot record read.
pub struct ReadHandle {
    receiver: Receiver<RemoteResult<Option<RawAttrs>>>,
}

impl ReadHandle {
    /// Create a sender/handle pair for one pending read.
    pub fn pair() -> (Sender<RemoteResult<Option<RawAttrs>>>, ReadHandle) {
        let (sender, receiver) = bounded(1);
        (sender, ReadHandle { receiver })
    }

    /// A handle that is already resolved.
    pub fn resolved(result: RemoteResult<Option<RawAttrs>>) -> ReadHandle {
        let (sender, handle) = Self::pair();
        let _ = sender.send(result);
        handle
    }

    /// Wait for the result (blocking).
    pub fn recv(&self) -> RemoteResult<Option<RawAttrs>> {
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Disconnected),
        }
    }

    /// Wait for the result, at most `timeout`.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<RemoteResult<Option<RawAttrs>>, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
