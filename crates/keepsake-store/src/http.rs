#![forbid(unsafe_code)]

//! Backend that fetches the JSON document over HTTP(S).

use std::time::Duration;

use crate::document::Document;
use crate::error::{FetchError, StoreError};
use crate::model::{ContentItem, ContentKind, UnlockConfig};
use crate::{Backend, ConfigStore, ContentStore, MediaStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches a [`Document`] from a URL on every call.
#[derive(Debug, Clone)]
pub struct HttpStore {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpStore {
    /// Create a store for `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Http(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn load(&self) -> Result<Document, FetchError> {
        let result = self
            .client
            .get(&self.url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(|e| StoreError::Http(e.to_string()))
            .and_then(|body| Document::parse(&body));
        result.map_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "backend fetch failed");
            e.into()
        })
    }
}

impl ConfigStore for HttpStore {
    fn get(&self) -> Result<UnlockConfig, FetchError> {
        self.load()?.unlock_config()
    }
}

impl ContentStore for HttpStore {
    fn list(
        &self,
        kind: ContentKind,
        limit: Option<usize>,
    ) -> Result<Vec<ContentItem>, FetchError> {
        Ok(self.load()?.content(kind, limit))
    }
}

impl MediaStore for HttpStore {
    fn list_media(&self, folder: &str) -> Result<Vec<ContentItem>, FetchError> {
        Ok(self.load()?.media(folder))
    }
}

impl Backend for HttpStore {
    fn name(&self) -> &str {
        "HttpStore"
    }
}
