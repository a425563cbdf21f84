#![forbid(unsafe_code)]

//! Remote collaborators for the keepsake reveal flow.
//!
//! The reveal flow reads three things from its backend and never writes:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ Backend = ConfigStore + ContentStore + MediaStore           │
//! │   ConfigStore::get          settings/config.unlockTime     │
//! │   ContentStore::list        reasons (optionally capped)    │
//! │   MediaStore::list_media    photos folder                  │
//! └────────────────────────────────────────────────────────────┘
//!            │
//!            ├── MemoryStore     in-process (tests, demos)
//!            ├── JsonFileStore   local JSON document
//!            └── HttpStore       same document over HTTP(S) (`http` feature)
//! ```
//!
//! All calls are blocking; the runtime runs them on background tasks. Every
//! call is a fresh fetch: nothing is cached, nothing is retried.

pub mod document;
pub mod error;
pub mod file;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;
pub mod model;

pub use document::Document;
pub use error::{FetchError, StoreError, require_non_empty};
pub use file::JsonFileStore;
#[cfg(feature = "http")]
pub use http::HttpStore;
pub use memory::MemoryStore;
pub use model::{
    ContentItem, ContentKind, DEFAULT_REASON_ICON, PHOTOS_FOLDER, Payload, UnlockConfig,
};

/// Reads the unlock configuration document.
pub trait ConfigStore: Send + Sync {
    /// Fetch the unlock configuration.
    ///
    /// Absent document or field is [`FetchError::ConfigMissing`].
    fn get(&self) -> Result<UnlockConfig, FetchError>;
}

/// Lists content collections.
pub trait ContentStore: Send + Sync {
    /// List items of `kind` in backing order, at most `limit` of them.
    ///
    /// An empty collection is `Ok(vec![])`; callers that need items classify
    /// it with [`require_non_empty`].
    fn list(&self, kind: ContentKind, limit: Option<usize>)
    -> Result<Vec<ContentItem>, FetchError>;
}

/// Lists downloadable media in a folder.
pub trait MediaStore: Send + Sync {
    /// List the photos in `folder`. Each item's id is its URL.
    fn list_media(&self, folder: &str) -> Result<Vec<ContentItem>, FetchError>;
}

/// Everything the reveal flow reads.
pub trait Backend: ConfigStore + ContentStore + MediaStore {
    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
