#![forbid(unsafe_code)]

//! In-process backend.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::error::FetchError;
use crate::model::{ContentItem, ContentKind, UnlockConfig};
use crate::{Backend, ConfigStore, ContentStore, MediaStore};

#[derive(Default)]
struct MemoryState {
    config: Option<UnlockConfig>,
    reasons: Vec<ContentItem>,
    media: HashMap<String, Vec<ContentItem>>,
    failure: Option<String>,
}

/// In-memory backend for tests and ephemeral demos.
///
/// Contents can be changed after the store is shared, and a failure switch
/// makes every call return [`FetchError::FetchFailure`]. Every call is
/// counted so tests can assert that nothing retries.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    fetches: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store (no config document, no content).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_unlock(self, target: DateTime<Utc>) -> Self {
        self.set_unlock(Some(target));
        self
    }

    #[must_use]
    pub fn with_reasons(self, reasons: Vec<ContentItem>) -> Self {
        if let Ok(mut guard) = self.state.write() {
            guard.reasons = reasons;
        }
        self
    }

    #[must_use]
    pub fn with_media(self, folder: &str, items: Vec<ContentItem>) -> Self {
        if let Ok(mut guard) = self.state.write() {
            guard.media.insert(folder.to_string(), items);
        }
        self
    }

    /// Make every subsequent call fail with `message`.
    #[must_use]
    pub fn failing(self, message: impl Into<String>) -> Self {
        self.set_failure(Some(message.into()));
        self
    }

    /// Replace (or remove) the unlock configuration document.
    pub fn set_unlock(&self, target: Option<DateTime<Utc>>) {
        if let Ok(mut guard) = self.state.write() {
            guard.config = target.map(UnlockConfig::new);
        }
    }

    /// Turn the failure switch on (`Some`) or off (`None`).
    pub fn set_failure(&self, message: Option<String>) {
        if let Ok(mut guard) = self.state.write() {
            guard.failure = message;
        }
    }

    /// Number of fetches served (successful or not).
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryState) -> Result<T, FetchError>) -> Result<T, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let guard = self
            .state
            .read()
            .map_err(|_| FetchError::FetchFailure("lock poisoned".into()))?;
        if let Some(msg) = &guard.failure {
            return Err(FetchError::FetchFailure(msg.clone()));
        }
        f(&guard)
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self) -> Result<UnlockConfig, FetchError> {
        self.read(|s| s.config.ok_or(FetchError::ConfigMissing))
    }
}

impl ContentStore for MemoryStore {
    fn list(
        &self,
        kind: ContentKind,
        limit: Option<usize>,
    ) -> Result<Vec<ContentItem>, FetchError> {
        self.read(|s| {
            let items = match kind {
                ContentKind::Reasons => &s.reasons,
            };
            Ok(items
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .cloned()
                .collect())
        })
    }
}

impl MediaStore for MemoryStore {
    fn list_media(&self, folder: &str) -> Result<Vec<ContentItem>, FetchError> {
        self.read(|s| Ok(s.media.get(folder).cloned().unwrap_or_default()))
    }
}

impl Backend for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (reasons, failing) = self
            .state
            .read()
            .map(|g| (g.reasons.len(), g.failure.is_some()))
            .unwrap_or((0, false));
        f.debug_struct("MemoryStore")
            .field("reasons", &reasons)
            .field("failing", &failing)
            .field("fetches", &self.fetch_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reasons(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| ContentItem::reason(format!("r{i}"), format!("reason {i}"), "❤️"))
            .collect()
    }

    #[test]
    fn empty_store_has_no_config() {
        let store = MemoryStore::new();
        assert_eq!(store.get(), Err(FetchError::ConfigMissing));
        assert_eq!(store.list(ContentKind::Reasons, None), Ok(vec![]));
        assert_eq!(store.fetch_count(), 2);
    }

    #[test]
    fn limit_takes_prefix_in_order() {
        let store = MemoryStore::new().with_reasons(reasons(12));
        let capped = store.list(ContentKind::Reasons, Some(10)).unwrap();
        assert_eq!(capped.len(), 10);
        assert_eq!(capped[0].id, "r0");
        assert_eq!(capped[9].id, "r9");
    }

    #[test]
    fn failure_switch_applies_to_every_call() {
        let target = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let store = MemoryStore::new().with_unlock(target).failing("offline");
        assert_eq!(store.get(), Err(FetchError::FetchFailure("offline".into())));
        assert!(store.list_media("photos").is_err());

        store.set_failure(None);
        assert_eq!(store.get().unwrap().target, target);
    }
}
