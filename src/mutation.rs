//! Mutation coordinator: validated writes with a bounded wait.
//!
//! Every mutating operation validates synchronously, submits exactly one
//! remote call, and then waits for the acknowledgement at most
//! `safety_deadline`. If the backend has not answered by then, the
//! operation force-resolves as success from the caller's perspective and
//! the discrepancy is logged; there is no retry and no rollback. This
//! trades strict consistency for a guaranteed worst-case latency on
//! single-user writes.
//!
//! A late acknowledgement lands on a channel nobody reads anymore, so the
//! caller observes at most one resolution per call.

use crate::codec;
use crate::engine::DirectoryConfig;
use crate::error::{DirectoryError, Result};
use crate::remote::{record_path, AckHandle, RawAttrs, RemoteStore};
use crate::status::Status;
use crate::types::{Item, ItemDraft, ItemId, OwnerId, Timestamp};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The four mutating operation kinds, each with its own in-flight flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Update,
    Transition,
    Delete,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::Create => "create",
            OpKind::Update => "update",
            OpKind::Transition => "transition",
            OpKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Clears the in-flight flag when the operation resolves, however it
/// resolves.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Issues create/update/status-transition/delete requests against the
/// remote store, one at a time per operation kind.
pub struct MutationCoordinator {
    store: Arc<dyn RemoteStore>,
    /// The caller's authenticated identity. Stamped onto new items exactly
    /// once, at creation.
    owner: OwnerId,
    config: DirectoryConfig,
    in_flight: [AtomicBool; 4],
}

impl MutationCoordinator {
    pub fn new(store: Arc<dyn RemoteStore>, owner: OwnerId, config: DirectoryConfig) -> Self {
        Self {
            store,
            owner,
            config,
            in_flight: [
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
            ],
        }
    }

    /// The identity new items are created under.
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Whether an operation of `op` kind is currently awaiting its backend
    /// response. The UI disables the matching submit control on this.
    pub fn is_in_flight(&self, op: OpKind) -> bool {
        self.in_flight[op as usize].load(Ordering::SeqCst)
    }

    /// Validate and persist a new item.
    ///
    /// Validation failures resolve synchronously, before any remote call.
    pub fn create(&self, draft: ItemDraft, photo: Option<&[u8]>) -> Result<Item> {
        let _guard = self.try_begin(OpKind::Create)?;

        draft.validate()?;
        let photo = photo
            .map(|bytes| codec::encode_photo(bytes, &self.config.photo))
            .transpose()?;

        let now = Timestamp::now();
        let key = self.store.allocate_key(&self.config.items_path);
        let item = Item {
            id: Some(ItemId(key.clone())),
            owner_id: self.owner.clone(),
            title: draft.title,
            description: draft.description,
            location: draft.location,
            contact_name: draft.contact_name,
            contact_phone: draft.contact_phone,
            contact_email: draft.contact_email,
            status: draft.status,
            photo,
            created_at: now,
            updated_at: now,
        };

        let path = record_path(&self.config.items_path, &key);
        let ack = self.store.write(&path, codec::encode(&item));
        self.await_ack(OpKind::Create, ack)?;
        Ok(item)
    }

    /// Persist changes to an existing item.
    ///
    /// A new photo replaces the old one; `None` leaves the stored photo
    /// untouched. `updated_at` is refreshed either way.
    pub fn update(&self, mut item: Item, photo: Option<&[u8]>) -> Result<Item> {
        let _guard = self.try_begin(OpKind::Update)?;

        let id = item.id.clone().ok_or(DirectoryError::MissingId)?;
        item.validate_for_write()?;

        if let Some(bytes) = photo {
            item.photo = Some(codec::encode_photo(bytes, &self.config.photo)?);
        }
        item.updated_at = Timestamp::now();

        let path = record_path(&self.config.items_path, id.as_str());
        let ack = self.store.write(&path, codec::encode(&item));
        self.await_ack(OpKind::Update, ack)?;
        Ok(item)
    }

    /// Advance an item one step along the lifecycle.
    ///
    /// Writes only the status field, keeping the write conflict surface
    /// minimal. A terminal status resolves as `NoValidTransition` with no
    /// remote call made.
    pub fn transition_status(&self, id: &ItemId, current: Status) -> Result<Status> {
        let _guard = self.try_begin(OpKind::Transition)?;

        let next = current
            .next()
            .ok_or(DirectoryError::NoValidTransition(current))?;
        debug!("transitioning {id} from {current} to {next}");

        let mut fields = RawAttrs::new();
        fields.insert("status_id".to_string(), Value::from(next.id()));

        let path = record_path(&self.config.items_path, id.as_str());
        let ack = self.store.patch(&path, fields);
        self.await_ack(OpKind::Transition, ack)?;
        Ok(next)
    }

    /// Remove an item's record entirely. The directory does not archive
    /// deleted records.
    pub fn delete(&self, id: &ItemId) -> Result<()> {
        let _guard = self.try_begin(OpKind::Delete)?;

        let path = record_path(&self.config.items_path, id.as_str());
        let ack = self.store.delete(&path);
        self.await_ack(OpKind::Delete, ack)
    }

    fn try_begin(&self, op: OpKind) -> Result<FlightGuard<'_>> {
        let flag = &self.in_flight[op as usize];
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Ok(FlightGuard { flag })
        } else {
            Err(DirectoryError::InFlight(op))
        }
    }

    /// Wait for the backend, bounded by the safety deadline.
    fn await_ack(&self, op: OpKind, ack: AckHandle) -> Result<()> {
        match ack.recv_timeout(self.config.safety_deadline) {
            Ok(Ok(())) => {
                debug!("{op} acknowledged by backend");
                Ok(())
            }
            Ok(Err(e)) => Err(DirectoryError::Mutation(e)),
            Err(_) => {
                warn!(
                    "safety deadline ({:?}) fired for {op}, resolving optimistically without \
                     backend confirmation",
                    self.config.safety_deadline
                );
                Ok(())
            }
        }
    }
}
