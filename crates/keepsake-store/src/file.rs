#![forbid(unsafe_code)]

//! Backend backed by a local JSON document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::{FetchError, StoreError};
use crate::model::{ContentItem, ContentKind, UnlockConfig};
use crate::{Backend, ConfigStore, ContentStore, MediaStore};

/// Reads a [`Document`] from disk on every call.
///
/// The file stands in for a remote backend, so edits made while the program
/// runs are picked up by the next fetch. A missing or malformed file is a
/// [`FetchError::FetchFailure`], not a missing config.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Document, FetchError> {
        let result = fs::read_to_string(&self.path)
            .map_err(StoreError::from)
            .and_then(|raw| Document::parse(&raw));
        match result {
            Ok(doc) => {
                tracing::debug!(path = %self.path.display(), "loaded backend document");
                Ok(doc)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "backend document unreadable");
                Err(e.into())
            }
        }
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self) -> Result<UnlockConfig, FetchError> {
        self.load()?.unlock_config()
    }
}

impl ContentStore for JsonFileStore {
    fn list(
        &self,
        kind: ContentKind,
        limit: Option<usize>,
    ) -> Result<Vec<ContentItem>, FetchError> {
        Ok(self.load()?.content(kind, limit))
    }
}

impl MediaStore for JsonFileStore {
    fn list_media(&self, folder: &str) -> Result<Vec<ContentItem>, FetchError> {
        Ok(self.load()?.media(folder))
    }
}

impl Backend for JsonFileStore {
    fn name(&self) -> &str {
        "JsonFileStore"
    }
}
