//! The media record model, as served by the backend index.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Image,
}

/// Bitrate-derived quality classification, assigned by the external scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityStatus {
    High,
    Ok,
}

/// One physical media file. `path` is the only stable identity; every join
/// (pairing, folder grouping) happens by string manipulation of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub path: String,
    pub size_mb: f64,
    #[serde(default)]
    pub bitrate_mbps: Option<f64>,
    #[serde(default)]
    pub duration_sec: Option<f64>,
    pub media_type: MediaType,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default = "default_status")]
    pub status: QualityStatus,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Epoch seconds; 0 means unset.
    #[serde(default)]
    pub imported_at: f64,
    /// Epoch seconds; 0 means unset.
    #[serde(default)]
    pub mtime: f64,
    #[serde(default)]
    pub thumb_ref: Option<String>,
}

fn default_status() -> QualityStatus {
    QualityStatus::Ok
}

impl MediaRecord {
    /// A record with everything but the identity left at its resting value.
    pub fn new(path: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            path: path.into(),
            size_mb: 0.0,
            bitrate_mbps: None,
            duration_sec: None,
            media_type,
            codec: None,
            status: QualityStatus::Ok,
            favorite: false,
            hidden: false,
            tags: BTreeSet::new(),
            imported_at: 0.0,
            mtime: 0.0,
            thumb_ref: None,
        }
    }

    /// Date used for age filtering: import time when known, file mtime
    /// otherwise.
    pub fn effective_date(&self) -> f64 {
        if self.imported_at > 0.0 {
            self.imported_at
        } else {
            self.mtime
        }
    }

    pub fn codec_or_unknown(&self) -> &str {
        self.codec.as_deref().unwrap_or("unknown")
    }

    pub fn file_name(&self) -> &str {
        paths::file_name(&self.path)
    }

    pub fn parent_dir(&self) -> &str {
        paths::parent_dir(&self.path)
    }
}
