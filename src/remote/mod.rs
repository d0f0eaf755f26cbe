//! Remote store client interface.
//!
//! The directory engine never talks to a concrete backend directly; it is
//! handed an `Arc<dyn RemoteStore>` at construction. The contract mirrors a
//! real-time document store:
//!
//! - collections of records keyed by opaque string ids
//! - a live feed that delivers whole-collection snapshots, not deltas
//! - asynchronous acks for every write, delivered over a channel
//!
//! All results arrive over `crossbeam_channel` receivers, so callers can
//! bound their wait with `recv_timeout`. The backend may fail or stay
//! silent forever; nothing here retries.
//!
//! # Example
//!
//! ```ignore
//! let feed = store.subscribe_collection("items", 1000);
//! loop {
//!     match feed.recv() {
//!         Ok(FeedEvent::Snapshot(records)) => println!("{} records", records.len()),
//!         Ok(FeedEvent::Error(e)) => eprintln!("feed error: {e}"),
//!         Err(_) => break,
//!     }
//! }
//! ```

mod memory;
mod types;

pub use memory::MemoryRemote;
pub use types::{AckHandle, FeedEvent, FeedHandle, FeedId, RawAttrs, ReadHandle, RemoteResult};

/// Subscribe/read/write primitives over collections of keyed records.
///
/// Record paths take the form `<collection>/<key>`; collection paths are the
/// bare collection name. Implementations deliver every result exactly once,
/// asynchronously, and never block the caller.
pub trait RemoteStore: Send + Sync {
    /// Open a live feed over a collection. Every inbound change delivers a
    /// whole-collection snapshot in backend arrival order.
    fn subscribe_collection(&self, path: &str, buffer: usize) -> FeedHandle;

    /// Release a feed, disconnecting its channel. Safe to call for a feed
    /// that is already gone.
    fn unsubscribe(&self, id: FeedId);

    /// Read a single record once.
    fn read_once(&self, path: &str) -> ReadHandle;

    /// Allocate a fresh record key under a collection, client-side, before
    /// any write happens.
    fn allocate_key(&self, path: &str) -> String;

    /// Set a record to exactly `value`.
    fn write(&self, path: &str, value: RawAttrs) -> AckHandle;

    /// Merge `fields` into an existing record, leaving other fields alone.
    fn patch(&self, path: &str, fields: RawAttrs) -> AckHandle;

    /// Remove a record.
    fn delete(&self, path: &str) -> AckHandle;
}

/// Build a `<collection>/<key>` record path.
pub fn record_path(collection: &str, key: &str) -> String {
    format!("{collection}/{key}")
}
