//! The boundary toward the excluded collaborators: payload shapes, the
//! backend trait, and the fire-and-forget write path.
//!
//! The engine never waits on a write for its own state transitions. Toggles
//! mutate the in-memory records immediately and park a `PendingWrite` on
//! the queue; `dispatch_pending` pushes the queue out and reports failures
//! as non-blocking notices without rolling anything back.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::BackendError;
use crate::record::MediaRecord;

/// `GET userData` shape, applied onto hydrated records exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataPayload {
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub vaulted: Vec<String>,
    #[serde(default)]
    pub tags: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub sensitive_dirs: Vec<String>,
    #[serde(default)]
    pub sensitive_tags: Vec<String>,
}

/// `GET tags` entry; display metadata only, never filtering input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDef {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub shortcut: Option<String>,
}

/// One not-yet-acknowledged mutation mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PendingWrite {
    ToggleFavorite { path: String, state: bool },
    ToggleHidden { path: String, state: bool },
    SetTags { path: String, tags: Vec<String> },
}

impl PendingWrite {
    pub fn path(&self) -> &str {
        match self {
            PendingWrite::ToggleFavorite { path, .. }
            | PendingWrite::ToggleHidden { path, .. }
            | PendingWrite::SetTags { path, .. } => path,
        }
    }
}

/// Writes waiting for dispatch, decoupled from the read path so retry or
/// rollback can be added without touching the synchronous pipeline.
#[derive(Debug, Default)]
pub struct WriteQueue {
    queue: VecDeque<PendingWrite>,
}

impl WriteQueue {
    pub fn push(&mut self, write: PendingWrite) {
        self.queue.push_back(write);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> Vec<PendingWrite> {
        self.queue.drain(..).collect()
    }
}

/// Non-blocking user notification surfaced by the write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

/// What the engine needs from the backend index.
pub trait MediaBackend {
    fn fetch_records(&self) -> Result<Vec<MediaRecord>, BackendError>;
    fn fetch_user_data(&self) -> Result<UserDataPayload, BackendError>;
    fn fetch_tags(&self) -> Result<Vec<TagDef>, BackendError>;
    fn submit(&self, write: &PendingWrite) -> Result<(), BackendError>;
}

/// Hydration boundary: malformed or missing data degrades to an empty
/// record set instead of halting the dashboard.
pub fn hydrate_records(backend: &dyn MediaBackend) -> Vec<MediaRecord> {
    match backend.fetch_records() {
        Ok(records) => {
            info!(count = records.len(), "hydrated media records");
            records
        }
        Err(err) => {
            warn!(error = %err, "records payload rejected; starting with an empty library");
            Vec::new()
        }
    }
}

/// Flush queued writes. Failures are logged and surfaced as notices; the
/// optimistic in-memory state stands until the next full reload.
pub fn dispatch_pending(queue: &mut WriteQueue, backend: &dyn MediaBackend) -> Vec<Notice> {
    let mut notices = Vec::new();
    for write in queue.drain() {
        if let Err(err) = backend.submit(&write) {
            warn!(path = write.path(), error = %err, "background save failed");
            notices.push(Notice {
                message: format!("Could not save changes for {}: {}", write.path(), err),
            });
        }
    }
    notices
}

/// Decode a raw `GET records` body.
pub fn decode_records(raw: &str) -> Result<Vec<MediaRecord>, BackendError> {
    serde_json::from_str(raw).map_err(|err| BackendError::MalformedPayload(err.to_string()))
}

/// Backend over a directory of JSON snapshot files. Stands in for the HTTP
/// index in tests and the terminal client; writes append to a journal file
/// instead of going anywhere.
#[derive(Debug, Clone)]
pub struct SnapshotBackend {
    root: PathBuf,
}

impl SnapshotBackend {
    pub const RECORDS_FILE: &'static str = "records.json";
    pub const USER_DATA_FILE: &'static str = "userdata.json";
    pub const TAGS_FILE: &'static str = "tags.json";
    pub const WRITES_FILE: &'static str = "writes.jsonl";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, file: &str) -> Result<String, BackendError> {
        fs::read_to_string(self.root.join(file)).map_err(BackendError::from)
    }
}

impl MediaBackend for SnapshotBackend {
    fn fetch_records(&self) -> Result<Vec<MediaRecord>, BackendError> {
        decode_records(&self.read(Self::RECORDS_FILE)?)
    }

    fn fetch_user_data(&self) -> Result<UserDataPayload, BackendError> {
        let raw = self.read(Self::USER_DATA_FILE)?;
        serde_json::from_str(&raw).map_err(|err| BackendError::MalformedPayload(err.to_string()))
    }

    fn fetch_tags(&self) -> Result<Vec<TagDef>, BackendError> {
        let raw = self.read(Self::TAGS_FILE)?;
        serde_json::from_str(&raw).map_err(|err| BackendError::MalformedPayload(err.to_string()))
    }

    fn submit(&self, write: &PendingWrite) -> Result<(), BackendError> {
        let line = serde_json::to_string(write)
            .map_err(|err| BackendError::MalformedPayload(err.to_string()))?;
        fs::create_dir_all(&self.root)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(Self::WRITES_FILE))?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingBackend;

    impl MediaBackend for FailingBackend {
        fn fetch_records(&self) -> Result<Vec<MediaRecord>, BackendError> {
            Err(BackendError::MalformedPayload("not an array".to_string()))
        }
        fn fetch_user_data(&self) -> Result<UserDataPayload, BackendError> {
            Err(BackendError::Unavailable("offline".to_string()))
        }
        fn fetch_tags(&self) -> Result<Vec<TagDef>, BackendError> {
            Ok(Vec::new())
        }
        fn submit(&self, _write: &PendingWrite) -> Result<(), BackendError> {
            Err(BackendError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_malformed_records_degrade_to_empty_library() {
        assert!(decode_records("{\"oops\": true}").is_err());
        assert!(hydrate_records(&FailingBackend).is_empty());
    }

    #[test]
    fn test_dispatch_failure_surfaces_notice_and_clears_queue() {
        let mut queue = WriteQueue::default();
        queue.push(PendingWrite::ToggleFavorite { path: "/a/x.mp4".to_string(), state: true });
        queue.push(PendingWrite::SetTags {
            path: "/a/y.mp4".to_string(),
            tags: vec!["trip".to_string()],
        });

        let notices = dispatch_pending(&mut queue, &FailingBackend);
        assert_eq!(notices.len(), 2);
        assert!(notices[0].message.contains("/a/x.mp4"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pending_write_round_trips_as_json() {
        let write = PendingWrite::ToggleHidden { path: "/a/x.mp4".to_string(), state: true };
        let raw = serde_json::to_string(&write).expect("encodes");
        let back: PendingWrite = serde_json::from_str(&raw).expect("decodes");
        assert_eq!(write, back);
    }

    #[test]
    fn test_snapshot_backend_round_trip() {
        let root = std::env::temp_dir().join(format!("mediamap-backend-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).expect("temp dir");

        let records = r#"[{"path": "/a/x.mp4", "sizeMb": 12.0, "mediaType": "video"}]"#;
        fs::write(root.join(SnapshotBackend::RECORDS_FILE), records).expect("write records");

        let backend = SnapshotBackend::new(&root);
        let hydrated = hydrate_records(&backend);
        assert_eq!(hydrated.len(), 1);
        assert_eq!(hydrated[0].path, "/a/x.mp4");

        backend
            .submit(&PendingWrite::ToggleFavorite { path: "/a/x.mp4".to_string(), state: true })
            .expect("journal write");
        let journal =
            fs::read_to_string(root.join(SnapshotBackend::WRITES_FILE)).expect("read journal");
        assert!(journal.contains("toggleFavorite"));

        let _ = fs::remove_dir_all(&root);
    }
}
