#![forbid(unsafe_code)]

//! Fetch error taxonomy.
//!
//! | Error | Cause | Screen behavior |
//! |-------|-------|-----------------|
//! | [`FetchError::ConfigMissing`] | Unlock document or field absent | Gate never starts, message shown |
//! | [`FetchError::FetchFailure`] | Transport or decode failure | Persistent message, action disabled |
//! | [`FetchError::EmptyContent`] | Fetch succeeded with zero items | Action disabled |
//!
//! None of these propagate past the screen that issued the fetch, and none
//! are retried.

use std::fmt;

/// Errors surfaced to screens by the remote collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The unlock configuration document (or its unlock field) does not exist.
    ConfigMissing,
    /// Network, file, or decode failure while fetching config or content.
    FetchFailure(String),
    /// The fetch succeeded but returned no items.
    EmptyContent,
}

impl FetchError {
    /// Stable identifier for structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            FetchError::ConfigMissing => "config_missing",
            FetchError::FetchFailure(_) => "fetch_failure",
            FetchError::EmptyContent => "empty_content",
        }
    }

    /// Short user-facing text for the degraded screen state.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            FetchError::ConfigMissing => "The surprise isn't ready yet. Please check back soon.",
            FetchError::FetchFailure(_) => "Couldn't reach the surprise. Please try again later.",
            FetchError::EmptyContent => "Nothing here yet.",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::ConfigMissing => write!(f, "unlock configuration is missing"),
            FetchError::FetchFailure(msg) => write!(f, "fetch failed: {msg}"),
            FetchError::EmptyContent => write!(f, "content list is empty"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Classify an empty successful list as [`FetchError::EmptyContent`].
pub fn require_non_empty<T>(items: Vec<T>) -> Result<Vec<T>, FetchError> {
    if items.is_empty() {
        Err(FetchError::EmptyContent)
    } else {
        Ok(items)
    }
}

/// Transport-level failures of a concrete backend.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error while reading the backing document.
    Io(std::io::Error),
    /// The document is not valid JSON or has the wrong shape.
    Parse(String),
    /// HTTP transport failure.
    Http(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::Parse(msg) => write!(f, "parse error: {msg}"),
            StoreError::Http(msg) => write!(f, "http error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Parse(_) | StoreError::Http(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Parse(e.to_string())
    }
}

impl From<StoreError> for FetchError {
    fn from(e: StoreError) -> Self {
        FetchError::FetchFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(FetchError::ConfigMissing.kind(), "config_missing");
        assert_eq!(FetchError::FetchFailure("x".into()).kind(), "fetch_failure");
        assert_eq!(FetchError::EmptyContent.kind(), "empty_content");
    }

    #[test]
    fn store_errors_become_fetch_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "keepsake.json");
        let err: FetchError = StoreError::from(io).into();
        assert!(matches!(err, FetchError::FetchFailure(ref m) if m.contains("keepsake.json")));
    }

    #[test]
    fn require_non_empty_classifies() {
        assert_eq!(require_non_empty::<u8>(vec![]), Err(FetchError::EmptyContent));
        assert_eq!(require_non_empty(vec![1]), Ok(vec![1]));
    }
}
