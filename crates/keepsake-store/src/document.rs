#![forbid(unsafe_code)]

//! The backend document shared by file and HTTP stores.
//!
//! ```json
//! {
//!   "settings": { "config": { "unlockTime": "2025-11-20T00:00:00+05:30" } },
//!   "reasons":  [ { "id": "r1", "text": "Your laugh", "icon": "😊" } ],
//!   "media":    { "photos": [ "https://example.com/photos/1.jpg" ] }
//! }
//! ```
//!
//! Unknown keys are ignored. Every section is optional; what a missing
//! section means is decided per accessor.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, StoreError};
use crate::model::{
    CONFIG_DOCUMENT, ContentItem, ContentKind, DEFAULT_REASON_ICON, UnlockConfig,
};

/// Deserialized backend document.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub settings: BTreeMap<String, SettingsDoc>,
    #[serde(default)]
    pub reasons: Vec<ReasonRecord>,
    #[serde(default)]
    pub media: BTreeMap<String, Vec<String>>,
}

/// A document in the `settings` collection.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SettingsDoc {
    #[serde(rename = "unlockTime", default, skip_serializing_if = "Option::is_none")]
    pub unlock_time: Option<UnlockTime>,
}

/// Unlock instant as stored: an RFC 3339 string with any offset, or a
/// seconds/nanoseconds timestamp object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnlockTime {
    Rfc3339(String),
    Timestamp {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
}

impl UnlockTime {
    fn to_utc(&self) -> Result<DateTime<Utc>, FetchError> {
        match self {
            UnlockTime::Rfc3339(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| FetchError::FetchFailure(format!("invalid unlockTime {raw:?}: {e}"))),
            UnlockTime::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds).ok_or_else(|| {
                FetchError::FetchFailure(format!("unlockTime out of range: {seconds}s"))
            }),
        }
    }
}

/// A record in the `reasons` collection.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReasonRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Document {
    /// Parse a document from JSON text.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Resolve the unlock configuration.
    ///
    /// A missing `settings/config` document or a missing `unlockTime` field
    /// is [`FetchError::ConfigMissing`]; an unparseable instant is a
    /// [`FetchError::FetchFailure`].
    pub fn unlock_config(&self) -> Result<UnlockConfig, FetchError> {
        let time = self
            .settings
            .get(CONFIG_DOCUMENT)
            .and_then(|doc| doc.unlock_time.as_ref())
            .ok_or(FetchError::ConfigMissing)?;
        Ok(UnlockConfig::new(time.to_utc()?))
    }

    /// Items of a content collection in backing order, capped at `limit`.
    #[must_use]
    pub fn content(&self, kind: ContentKind, limit: Option<usize>) -> Vec<ContentItem> {
        let cap = limit.unwrap_or(usize::MAX);
        match kind {
            ContentKind::Reasons => self
                .reasons
                .iter()
                .take(cap)
                .enumerate()
                .map(|(idx, rec)| {
                    ContentItem::reason(
                        rec.id.clone().unwrap_or_else(|| idx.to_string()),
                        rec.text.clone().unwrap_or_default(),
                        rec.icon
                            .clone()
                            .unwrap_or_else(|| DEFAULT_REASON_ICON.to_string()),
                    )
                })
                .collect(),
        }
    }

    /// Photos in a media folder. A folder that does not exist lists as empty.
    #[must_use]
    pub fn media(&self, folder: &str) -> Vec<ContentItem> {
        self.media
            .get(folder)
            .map(|urls| urls.iter().map(ContentItem::photo).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"{
        "settings": { "config": { "unlockTime": "2025-11-20T00:00:00+05:30" } },
        "reasons": [
            { "id": "a", "text": "Your laugh", "icon": "😊" },
            { "id": "b" },
            { "text": "No id" }
        ],
        "media": { "photos": ["https://x/1.jpg", "https://x/2.jpg"] },
        "unrelated": true
    }"#;

    #[test]
    fn unlock_time_is_normalised_to_utc() {
        let doc = Document::parse(SAMPLE).unwrap();
        let cfg = doc.unlock_config().unwrap();
        assert_eq!(cfg.target, Utc.with_ymd_and_hms(2025, 11, 19, 18, 30, 0).unwrap());
    }

    #[test]
    fn timestamp_object_is_accepted() {
        let doc =
            Document::parse(r#"{"settings":{"config":{"unlockTime":{"seconds":1763577000}}}}"#)
                .unwrap();
        assert_eq!(
            doc.unlock_config().unwrap().target,
            Utc.with_ymd_and_hms(2025, 11, 19, 18, 30, 0).unwrap()
        );
    }

    #[test]
    fn missing_config_is_config_missing() {
        let doc = Document::parse("{}").unwrap();
        assert_eq!(doc.unlock_config(), Err(FetchError::ConfigMissing));

        let doc = Document::parse(r#"{"settings":{"config":{}}}"#).unwrap();
        assert_eq!(doc.unlock_config(), Err(FetchError::ConfigMissing));
    }

    #[test]
    fn bad_instant_is_fetch_failure() {
        let doc = Document::parse(r#"{"settings":{"config":{"unlockTime":"tomorrow"}}}"#).unwrap();
        assert!(matches!(doc.unlock_config(), Err(FetchError::FetchFailure(_))));
    }

    #[test]
    fn reasons_fill_defaults_and_respect_limit() {
        let doc = Document::parse(SAMPLE).unwrap();
        let all = doc.content(ContentKind::Reasons, None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].text(), Some(""));
        assert_eq!(all[1].icon(), Some(DEFAULT_REASON_ICON));
        assert_eq!(all[2].id, "2");

        let capped = doc.content(ContentKind::Reasons, Some(1));
        assert_eq!(capped, vec![ContentItem::reason("a", "Your laugh", "😊")]);
    }

    #[test]
    fn media_folder_lists_urls() {
        let doc = Document::parse(SAMPLE).unwrap();
        let photos = doc.media("photos");
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].url(), Some("https://x/1.jpg"));
        assert_eq!(photos[0].id, "https://x/1.jpg");
        assert!(doc.media("videos").is_empty());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(Document::parse("{not json"), Err(StoreError::Parse(_))));
    }
}
