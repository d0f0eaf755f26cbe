//! # Item Directory Synchronization Engine
//!
//! A client-side engine for a lost-and-found item directory backed by a
//! remote real-time store:
//!
//! - **Directory cache**: mirrors the remote item collection into an
//!   in-memory snapshot, replaced wholesale on every delivery
//! - **Views**: filtering, free-text search, and per-owner views derived
//!   locally, without re-querying the backend
//! - **Mutations**: create/update/status-transition/delete with client-side
//!   validation and a safety deadline that bounds every wait
//! - **Lifecycle**: reports move forward only, Lost -> Found -> Claimed
//!
//! ## Example
//!
//! ```ignore
//! use reclaim::{Directory, DirectoryConfig, ItemDraft, MemoryRemote, OwnerId, Status};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryRemote::new());
//! let directory = Directory::new(store, OwnerId::from("user-1"), DirectoryConfig::default());
//!
//! // Post a report
//! let item = directory.mutations().create(ItemDraft {
//!     title: "Blue backpack".into(),
//!     description: "Left near the fountain".into(),
//!     location: Some("Main quad".into()),
//!     contact_name: "Sam".into(),
//!     contact_phone: "555-0101".into(),
//!     contact_email: None,
//!     status: Status::Lost,
//! }, None)?;
//!
//! // Follow the directory
//! let feed = directory.cache().subscribe();
//! let snapshot = directory.cache().snapshot();
//! let lost = snapshot.filtered(reclaim::ItemFilter::LostOnly);
//! ```

pub mod codec;
pub mod directory;
pub mod engine;
pub mod error;
pub mod mutation;
pub mod remote;
pub mod status;
pub mod types;

// Re-exports
pub use codec::PhotoConfig;
pub use directory::{DirectoryCache, DirectoryEvent, DirectoryHandle, DirectorySnapshot};
pub use engine::{Directory, DirectoryConfig};
pub use error::{DecodeError, DirectoryError, RemoteError, Result};
pub use mutation::{MutationCoordinator, OpKind};
pub use remote::{
    AckHandle, FeedEvent, FeedHandle, FeedId, MemoryRemote, RawAttrs, ReadHandle, RemoteStore,
};
pub use status::Status;
pub use types::{Item, ItemDraft, ItemFilter, ItemId, OwnerId, Photo, Timestamp};
