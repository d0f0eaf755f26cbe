//! In-memory remote store for tests and local development.

use super::types::{AckHandle, FeedEvent, FeedHandle, FeedId, RawAttrs, ReadHandle};
use super::RemoteStore;
use crate::error::RemoteError;
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// An in-process stand-in for the real-time backend.
///
/// Keeps ordered collections of keyed records, re-broadcasts a whole
/// snapshot to every feed after each successful mutation, and acknowledges
/// writes immediately. Failure and silence can be injected for tests:
///
/// - [`set_fail_writes`](MemoryRemote::set_fail_writes) makes every mutation
///   ack with the given error;
/// - [`set_silent`](MemoryRemote::set_silent) makes the backend accept
///   mutations but never acknowledge them (the pending senders are held so
///   callers time out instead of observing a disconnect).
pub struct MemoryRemote {
    inner: Mutex<Inner>,
    next_feed: AtomicU64,
    next_key: AtomicU64,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<(String, RawAttrs)>>,
    feeds: Vec<Feed>,
    fail_writes: Option<RemoteError>,
    silent: bool,
    held_acks: Vec<Sender<super::RemoteResult<()>>>,
    held_reads: Vec<Sender<super::RemoteResult<Option<RawAttrs>>>>,
    write_count: u64,
}

struct Feed {
    id: FeedId,
    path: String,
    sender: Sender<FeedEvent>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            next_feed: AtomicU64::new(1),
            next_key: AtomicU64::new(1),
        }
    }

    /// Insert a record directly, without broadcasting. For seeding test
    /// fixtures before any subscription exists.
    pub fn seed(&self, collection: &str, key: &str, attrs: RawAttrs) {
        let mut inner = self.inner.lock();
        upsert(
            inner.collections.entry(collection.to_string()).or_default(),
            key,
            attrs,
        );
    }

    /// Make every subsequent mutation ack with `err` (or behave normally
    /// again with `None`).
    pub fn set_fail_writes(&self, err: Option<RemoteError>) {
        self.inner.lock().fail_writes = err;
    }

    /// Make the backend swallow mutations and reads without ever responding.
    pub fn set_silent(&self, silent: bool) {
        self.inner.lock().silent = silent;
    }

    /// Number of mutation calls (write/patch/delete) received so far.
    pub fn write_count(&self) -> u64 {
        self.inner.lock().write_count
    }

    /// Broadcast a transport error to every feed on `collection`.
    pub fn inject_feed_error(&self, collection: &str, err: RemoteError) {
        let inner = self.inner.lock();
        for feed in inner.feeds.iter().filter(|f| f.path == collection) {
            let _ = feed.sender.try_send(FeedEvent::Error(err.clone()));
        }
    }

    /// Current contents of a collection, in insertion order.
    pub fn collection(&self, path: &str) -> Vec<(String, RawAttrs)> {
        self.inner
            .lock()
            .collections
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    fn mutate<F>(&self, path: &str, apply: F) -> AckHandle
    where
        F: FnOnce(&mut Vec<(String, RawAttrs)>, &str),
    {
        let mut inner = self.inner.lock();
        inner.write_count += 1;

        let Some((collection, key)) = path.rsplit_once('/') else {
            return AckHandle::resolved(Err(RemoteError::Rejected(format!(
                "malformed record path: {path}"
            ))));
        };

        if let Some(err) = inner.fail_writes.clone() {
            return AckHandle::resolved(Err(err));
        }

        if inner.silent {
            // Swallow the mutation: no state change, no ack. Keep the sender
            // alive so the caller times out rather than seeing a disconnect.
            let (sender, handle) = AckHandle::pair();
            inner.held_acks.push(sender);
            return handle;
        }

        let records = inner
            .collections
            .entry(collection.to_string())
            .or_default();
        apply(records, key);

        broadcast(&mut inner, collection);
        AckHandle::resolved(Ok(()))
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryRemote {
    fn subscribe_collection(&self, path: &str, buffer: usize) -> FeedHandle {
        let id = FeedId(self.next_feed.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(buffer);

        let mut inner = self.inner.lock();
        // The backend delivers the current value immediately on subscribe.
        let current = inner.collections.get(path).cloned().unwrap_or_default();
        let _ = sender.try_send(FeedEvent::Snapshot(current));

        inner.feeds.push(Feed {
            id,
            path: path.to_string(),
            sender,
        });

        FeedHandle { id, receiver }
    }

    fn unsubscribe(&self, id: FeedId) {
        self.inner.lock().feeds.retain(|f| f.id != id);
    }

    fn read_once(&self, path: &str) -> ReadHandle {
        let mut inner = self.inner.lock();

        if inner.silent {
            let (sender, handle) = ReadHandle::pair();
            inner.held_reads.push(sender);
            return handle;
        }

        if let Some(err) = inner.fail_writes.clone() {
            return ReadHandle::resolved(Err(err));
        }

        let Some((collection, key)) = path.rsplit_once('/') else {
            return ReadHandle::resolved(Err(RemoteError::Rejected(format!(
                "malformed record path: {path}"
            ))));
        };

        let found = inner.collections.get(collection).and_then(|records| {
            records
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, attrs)| attrs.clone())
        });
        ReadHandle::resolved(Ok(found))
    }

    fn allocate_key(&self, _path: &str) -> String {
        format!("k{:06}", self.next_key.fetch_add(1, Ordering::SeqCst))
    }

    fn write(&self, path: &str, value: RawAttrs) -> AckHandle {
        self.mutate(path, |records, key| upsert(records, key, value))
    }

    fn patch(&self, path: &str, fields: RawAttrs) -> AckHandle {
        self.mutate(path, |records, key| {
            if let Some((_, attrs)) = records.iter_mut().find(|(k, _)| k == key) {
                for (name, value) in fields {
                    attrs.insert(name, value);
                }
            } else {
                records.push((key.to_string(), fields));
            }
        })
    }

    fn delete(&self, path: &str) -> AckHandle {
        self.mutate(path, |records, key| records.retain(|(k, _)| k != key))
    }
}

/// Replace a record in place, or append it, preserving insertion order.
fn upsert(records: &mut Vec<(String, RawAttrs)>, key: &str, attrs: RawAttrs) {
    if let Some((_, existing)) = records.iter_mut().find(|(k, _)| k == key) {
        *existing = attrs;
    } else {
        records.push((key.to_string(), attrs));
    }
}

/// Send the full collection to every feed on `path`, dropping feeds whose
/// buffers are full or whose receivers are gone.
fn broadcast(inner: &mut Inner, path: &str) {
    let snapshot: Vec<(String, RawAttrs)> = inner
        .collections
        .get(path)
        .cloned()
        .unwrap_or_default();

    let mut dropped = Vec::new();
    for feed in inner.feeds.iter().filter(|f| f.path == path) {
        if feed
            .sender
            .try_send(FeedEvent::Snapshot(snapshot.clone()))
            .is_err()
        {
            dropped.push(feed.id);
        }
    }
    inner.feeds.retain(|f| !dropped.contains(&f.id));
}
