//! Process-wide wiring: one remote client, one cache, one coordinator.
//!
//! The remote store is an explicit, constructed dependency — a single
//! [`Directory`] instance wired at startup replaces any hidden global
//! client while preserving the single-subscription invariant.

use crate::codec::PhotoConfig;
use crate::directory::DirectoryCache;
use crate::mutation::MutationCoordinator;
use crate::remote::{record_path, RawAttrs, RemoteStore};
use crate::status::Status;
use crate::types::{OwnerId, Timestamp};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Directory engine configuration.
#[derive(Clone, Debug)]
pub struct DirectoryConfig {
    /// Collection path of item records.
    pub items_path: String,

    /// Collection path of the status metadata table.
    pub status_path: String,

    /// Max buffered feed events before a slow consumer is dropped.
    /// Default: 1000
    pub feed_buffer: usize,

    /// Worst-case wait on any backend acknowledgement. When it fires, the
    /// pending operation force-resolves as success and the discrepancy is
    /// logged. Default: 1000 ms.
    pub safety_deadline: Duration,

    /// Bounds applied when embedding photos.
    pub photo: PhotoConfig,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            items_path: "items".to_string(),
            status_path: "item_status".to_string(),
            feed_buffer: 1000,
            safety_deadline: Duration::from_millis(1000),
            photo: PhotoConfig::default(),
        }
    }
}

/// The item directory engine.
///
/// Ties one remote store client to the directory cache and the mutation
/// coordinator. Construct exactly one per process, at startup.
pub struct Directory {
    store: Arc<dyn RemoteStore>,
    cache: DirectoryCache,
    mutations: MutationCoordinator,
}

impl Directory {
    /// Wire the engine for the authenticated `owner`.
    ///
    /// Seeds the status metadata table on first contact with a fresh
    /// backend; seeding failures are logged and non-fatal.
    pub fn new(store: Arc<dyn RemoteStore>, owner: OwnerId, config: DirectoryConfig) -> Self {
        seed_status_table(store.as_ref(), &config);

        let cache = DirectoryCache::new(Arc::clone(&store), config.clone());
        let mutations = MutationCoordinator::new(Arc::clone(&store), owner, config);

        Self {
            store,
            cache,
            mutations,
        }
    }

    /// The live directory cache.
    pub fn cache(&self) -> &DirectoryCache {
        &self.cache
    }

    /// The mutation coordinator.
    pub fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }

    /// The shared remote store client.
    pub fn store(&self) -> Arc<dyn RemoteStore> {
        Arc::clone(&self.store)
    }
}

/// Write the three-row status table if the backend does not have one yet.
fn seed_status_table(store: &dyn RemoteStore, config: &DirectoryConfig) {
    let probe = store.read_once(&record_path(&config.status_path, "1"));
    match probe.recv_timeout(config.safety_deadline) {
        Ok(Ok(Some(_))) => return,
        Ok(Ok(None)) => {}
        Ok(Err(e)) => {
            warn!("could not probe status table: {e}");
            return;
        }
        Err(_) => {
            warn!("status table probe timed out");
            return;
        }
    }

    for status in Status::all() {
        let mut attrs = RawAttrs::new();
        attrs.insert("id".to_string(), Value::from(status.id()));
        attrs.insert("name".to_string(), Value::from(status.name()));
        attrs.insert("color".to_string(), Value::from(status.color()));
        attrs.insert("created_at".to_string(), Value::from(Timestamp::now().0));

        let path = record_path(&config.status_path, &status.id().to_string());
        let ack = store.write(&path, attrs);
        match ack.recv_timeout(config.safety_deadline) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to seed status {status}: {e}"),
            Err(_) => warn!("seeding status {status} timed out"),
        }
    }
    debug!("seeded status metadata table");
}
