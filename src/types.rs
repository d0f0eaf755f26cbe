//! Core types for the item directory.

use crate::error::{DirectoryError, Result};
use crate::status::Status;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque key for an item record, assigned by the remote store on creation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user that created an item. Set once, at creation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        OwnerId(s.to_string())
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Microseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        Timestamp(duration.as_micros() as i64)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// An item's photo as stored on the wire.
///
/// New records carry a size-bounded JPEG as a base64 data URI. Older records
/// may carry a plain URL; those pass through untouched for remote loading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Photo {
    /// `data:image/<fmt>;base64,...` payload produced by the photo codec.
    Encoded(String),
    /// Bare URL, kept for backward compatibility.
    Url(String),
}

impl Photo {
    /// The raw string form written to the record.
    pub fn as_str(&self) -> &str {
        match self {
            Photo::Encoded(s) | Photo::Url(s) => s,
        }
    }
}

/// A lost-or-found report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Record key (assigned by the remote store). `None` until first persisted.
    pub id: Option<ItemId>,

    /// Creating user. Immutable after creation.
    pub owner_id: OwnerId,

    /// Short title. Required non-empty for writes.
    pub title: String,

    /// Longer description. Required non-empty for writes.
    pub description: String,

    /// Where the item was lost or found.
    pub location: Option<String>,

    /// Name to contact about the item. Required non-empty for writes.
    pub contact_name: String,

    /// Phone to contact about the item. Required non-empty for writes.
    pub contact_phone: String,

    /// Optional contact email.
    pub contact_email: Option<String>,

    /// Lifecycle stage. Moves only forward.
    pub status: Status,

    /// Optional embedded or linked photo.
    pub photo: Option<Photo>,

    /// Set once at creation.
    pub created_at: Timestamp,

    /// Refreshed on every mutation.
    pub updated_at: Timestamp,
}

impl Item {
    /// Whether this record may re-enter the write path.
    ///
    /// Legacy records with empty required fields still decode and display,
    /// but they stay read-only until corrected.
    pub fn validate_for_write(&self) -> Result<()> {
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.description, "description")?;
        require_non_empty(&self.contact_name, "contact name")?;
        require_non_empty(&self.contact_phone, "contact phone")?;
        Ok(())
    }
}

/// Input for creating a new item (before a key is assigned).
#[derive(Clone, Debug)]
pub struct ItemDraft {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    /// Initial status chosen by the creator. Restricted to Lost or Found.
    pub status: Status,
}

impl ItemDraft {
    /// Check required fields and the initial status.
    ///
    /// Runs synchronously before any remote work; a failure here means no
    /// remote call was made.
    pub fn validate(&self) -> Result<()> {
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.description, "description")?;
        require_non_empty(&self.contact_name, "contact name")?;
        require_non_empty(&self.contact_phone, "contact phone")?;
        if !self.status.is_initial() {
            return Err(DirectoryError::NoValidTransition(self.status));
        }
        Ok(())
    }
}

fn require_non_empty(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        Err(DirectoryError::MissingRequired(field))
    } else {
        Ok(())
    }
}

/// Directory filter selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ItemFilter {
    /// Every active item. Claimed items are archival and excluded.
    #[default]
    All,
    /// Only items still reported lost.
    LostOnly,
    /// Only items reported found.
    FoundOnly,
}

impl ItemFilter {
    /// Whether an item with `status` appears under this filter.
    pub fn admits(self, status: Status) -> bool {
        match self {
            ItemFilter::All => status != Status::Claimed,
            ItemFilter::LostOnly => status == Status::Lost,
            ItemFilter::FoundOnly => status == Status::Found,
        }
    }
}
