#![forbid(unsafe_code)]

//! Values returned by the remote collaborators.

use chrono::{DateTime, Utc};

/// Collection holding the unlock configuration document.
pub const SETTINGS_COLLECTION: &str = "settings";
/// Document inside [`SETTINGS_COLLECTION`] that carries the unlock instant.
pub const CONFIG_DOCUMENT: &str = "config";
/// Field of [`CONFIG_DOCUMENT`] holding the unlock instant.
pub const UNLOCK_FIELD: &str = "unlockTime";
/// Media folder listed by the gallery.
pub const PHOTOS_FOLDER: &str = "photos";
/// Icon used when a reason record has none.
pub const DEFAULT_REASON_ICON: &str = "❤️";

/// The absolute instant at which the experience unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockConfig {
    pub target: DateTime<Utc>,
}

impl UnlockConfig {
    #[must_use]
    pub const fn new(target: DateTime<Utc>) -> Self {
        Self { target }
    }
}

/// Named content collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Short "reasons" notes with an icon each.
    Reasons,
}

impl ContentKind {
    /// Backing collection name.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            ContentKind::Reasons => "reasons",
        }
    }
}

/// Kind-specific content of a [`ContentItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Reason { text: String, icon: String },
    Photo { url: String },
}

/// A remotely stored piece of content. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub id: String,
    pub payload: Payload,
}

impl ContentItem {
    /// A reason note.
    #[must_use]
    pub fn reason(id: impl Into<String>, text: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: Payload::Reason {
                text: text.into(),
                icon: icon.into(),
            },
        }
    }

    /// A photo, identified by its URL.
    #[must_use]
    pub fn photo(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: url.clone(),
            payload: Payload::Photo { url },
        }
    }

    /// Reason text, or `None` for non-reason items.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Reason { text, .. } => Some(text),
            Payload::Photo { .. } => None,
        }
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        match &self.payload {
            Payload::Reason { icon, .. } => Some(icon),
            Payload::Photo { .. } => None,
        }
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.payload {
            Payload::Photo { url } => Some(url),
            Payload::Reason { .. } => None,
        }
    }
}
