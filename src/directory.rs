//! Item directory cache: one live mirror of the remote collection.
//!
//! The cache owns the authoritative local projection of the item
//! collection. Every inbound feed delivery replaces the snapshot wholesale
//! (the backend sends whole collections, not deltas), so readers always see
//! a complete, consistent item list. Filtering and search are re-derived on
//! demand from the snapshot and never touch the backend.

use crate::codec;
use crate::engine::DirectoryConfig;
use crate::error::{DirectoryError, RemoteError, Result};
use crate::remote::{record_path, FeedEvent, FeedHandle, FeedId, RemoteStore};
use crate::status::Status;
use crate::types::{Item, ItemFilter, ItemId, OwnerId};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, warn};

/// One complete replacement delivery of the directory.
#[derive(Clone, Debug, Default)]
pub struct DirectorySnapshot {
    items: Vec<Item>,
}

impl DirectorySnapshot {
    /// Build a snapshot from already-decoded items, in delivery order.
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// All items, in backend arrival order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up one item by id.
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id.as_ref() == Some(id))
    }

    /// Items admitted by `filter`, in snapshot order. `All` excludes
    /// claimed items; they are archival, not active.
    pub fn filtered(&self, filter: ItemFilter) -> Vec<Item> {
        self.items
            .iter()
            .filter(|item| filter.admits(item.status))
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over title, description, and
    /// location, composed with `filter`.
    ///
    /// An empty query reduces exactly to [`filtered`](Self::filtered). A
    /// non-empty query under `All` spans every status, claimed included;
    /// only the Lost/Found filters restrict search results.
    pub fn search(&self, query: &str, filter: ItemFilter) -> Vec<Item> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.filtered(filter);
        }

        self.items
            .iter()
            .filter(|item| {
                let hit = contains_ci(&item.title, &query)
                    || contains_ci(&item.description, &query)
                    || item
                        .location
                        .as_deref()
                        .is_some_and(|loc| contains_ci(loc, &query));
                hit && search_admits(filter, item.status)
            })
            .cloned()
            .collect()
    }

    /// The owner's claimed items.
    pub fn archived(&self, owner: &OwnerId) -> Vec<Item> {
        self.items
            .iter()
            .filter(|item| item.owner_id == *owner && item.status == Status::Claimed)
            .cloned()
            .collect()
    }

    /// The owner's items that are still active.
    pub fn owned_active(&self, owner: &OwnerId) -> Vec<Item> {
        self.items
            .iter()
            .filter(|item| item.owner_id == *owner && item.status != Status::Claimed)
            .cloned()
            .collect()
    }
}

fn contains_ci(haystack: &str, lowered_query: &str) -> bool {
    haystack.to_lowercase().contains(lowered_query)
}

fn search_admits(filter: ItemFilter, status: Status) -> bool {
    match filter {
        ItemFilter::All => true,
        ItemFilter::LostOnly => status == Status::Lost,
        ItemFilter::FoundOnly => status == Status::Found,
    }
}

/// Events delivered to a directory consumer.
#[derive(Clone, Debug)]
pub enum DirectoryEvent {
    /// The projection was replaced by a fresh snapshot.
    Snapshot(Arc<DirectorySnapshot>),

    /// The live feed reported a transport failure. The last good snapshot
    /// stays available.
    SubscriptionError(RemoteError),
}

/// Handle to a live directory subscription.
pub struct DirectoryHandle {
    receiver: Receiver<DirectoryEvent>,
}

impl DirectoryHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<DirectoryEvent> {
        self.receiver
            .recv()
            .map_err(|_| DirectoryError::Subscription(RemoteError::Disconnected))
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Option<DirectoryEvent> {
        self.receiver.try_recv().ok()
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<DirectoryEvent> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => {
                DirectoryError::Subscription(RemoteError::Transport("timed out".to_string()))
            }
            RecvTimeoutError::Disconnected => {
                DirectoryError::Subscription(RemoteError::Disconnected)
            }
        })
    }
}

struct ActiveFeed {
    id: FeedId,
    pump: Option<JoinHandle<()>>,
}

/// Live mirror of the remote item collection.
pub struct DirectoryCache {
    store: Arc<dyn RemoteStore>,
    config: DirectoryConfig,
    /// Last good snapshot. Replaced wholesale, never mutated in place.
    snapshot: Arc<RwLock<Arc<DirectorySnapshot>>>,
    active_filter: RwLock<ItemFilter>,
    feed: Mutex<Option<ActiveFeed>>,
}

impl DirectoryCache {
    pub fn new(store: Arc<dyn RemoteStore>, config: DirectoryConfig) -> Self {
        Self {
            store,
            config,
            snapshot: Arc::new(RwLock::new(Arc::new(DirectorySnapshot::default()))),
            active_filter: RwLock::new(ItemFilter::All),
            feed: Mutex::new(None),
        }
    }

    /// Establish the live subscription and return its event stream.
    ///
    /// Only one subscription is active per cache; calling this again
    /// releases the previous one first.
    pub fn subscribe(&self) -> DirectoryHandle {
        self.unsubscribe();

        let feed = self
            .store
            .subscribe_collection(&self.config.items_path, self.config.feed_buffer);
        let feed_id = feed.id;

        let (sender, receiver) = bounded(self.config.feed_buffer);
        let slot = Arc::clone(&self.snapshot);
        let pump = thread::spawn(move || pump_feed(feed, sender, slot));

        *self.feed.lock() = Some(ActiveFeed {
            id: feed_id,
            pump: Some(pump),
        });

        DirectoryHandle { receiver }
    }

    /// Release the active subscription. No-op when none is active.
    pub fn unsubscribe(&self) {
        let previous = self.feed.lock().take();
        if let Some(mut active) = previous {
            // Releasing the feed disconnects its channel; the pump exits.
            self.store.unsubscribe(active.id);
            if let Some(pump) = active.pump.take() {
                let _ = pump.join();
            }
        }
    }

    /// The last good snapshot. Retained across feed errors.
    pub fn snapshot(&self) -> Arc<DirectorySnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Set the active filter used by empty-query search.
    pub fn set_filter(&self, filter: ItemFilter) {
        *self.active_filter.write() = filter;
    }

    /// The currently active filter.
    pub fn filter(&self) -> ItemFilter {
        *self.active_filter.read()
    }

    /// Items of `snapshot` admitted by `filter`, in snapshot order.
    pub fn apply_filter(&self, snapshot: &DirectorySnapshot, filter: ItemFilter) -> Vec<Item> {
        snapshot.filtered(filter)
    }

    /// Search `snapshot` under the currently active filter.
    pub fn search(&self, snapshot: &DirectorySnapshot, query: &str) -> Vec<Item> {
        snapshot.search(query, self.filter())
    }

    /// The owner's claimed items.
    pub fn archived_view(&self, snapshot: &DirectorySnapshot, owner: &OwnerId) -> Vec<Item> {
        snapshot.archived(owner)
    }

    /// The owner's still-active items.
    pub fn owned_active_view(&self, snapshot: &DirectorySnapshot, owner: &OwnerId) -> Vec<Item> {
        snapshot.owned_active(owner)
    }

    /// Fetch and decode a single item once, bypassing the projection.
    pub fn read_item(&self, id: &ItemId) -> Result<Option<Item>> {
        let path = record_path(&self.config.items_path, id.as_str());
        let handle = self.store.read_once(&path);
        match handle.recv_timeout(self.config.safety_deadline) {
            Ok(Ok(Some(attrs))) => Ok(Some(codec::decode(id.as_str(), &attrs)?)),
            Ok(Ok(None)) => Ok(None),
            Ok(Err(e)) => Err(DirectoryError::Subscription(e)),
            Err(_) => Err(DirectoryError::Subscription(RemoteError::Transport(
                "read timed out".to_string(),
            ))),
        }
    }
}

impl Drop for DirectoryCache {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Feed pump: decode every delivery, replace the shared snapshot, forward
/// to the consumer. Runs until the feed or the consumer goes away.
fn pump_feed(
    feed: FeedHandle,
    sender: Sender<DirectoryEvent>,
    slot: Arc<RwLock<Arc<DirectorySnapshot>>>,
) {
    loop {
        match feed.recv() {
            Ok(FeedEvent::Snapshot(records)) => {
                let mut items = Vec::with_capacity(records.len());
                for (key, attrs) in &records {
                    match codec::decode(key, attrs) {
                        Ok(item) => items.push(item),
                        Err(e) => error!("skipping undecodable record {key}: {e}"),
                    }
                }
                debug!(
                    "directory snapshot replaced: {} delivered, {} projected",
                    records.len(),
                    items.len()
                );

                let snap = Arc::new(DirectorySnapshot::new(items));
                *slot.write() = Arc::clone(&snap);

                if sender.try_send(DirectoryEvent::Snapshot(snap)).is_err() {
                    warn!("directory consumer gone or lagging, stopping pump");
                    break;
                }
            }
            Ok(FeedEvent::Error(e)) => {
                warn!("subscription transport error, keeping last good snapshot: {e}");
                if sender
                    .try_send(DirectoryEvent::SubscriptionError(e))
                    .is_err()
                {
                    break;
                }
            }
            // Feed released.
            Err(_) => break,
        }
    }
}
