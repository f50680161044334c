//! The in-memory record array and its mutation surface.
//!
//! Refresh replaces the whole array; favorite/hidden/tag toggles mutate
//! records in place optimistically and enqueue their write mirrors. Readers
//! only ever borrow.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::backend::{PendingWrite, UserDataPayload, WriteQueue};
use crate::record::MediaRecord;

#[derive(Debug, Default)]
pub struct MediaStore {
    records: Vec<MediaRecord>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<MediaRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Full refresh from a new hydration.
    pub fn replace_all(&mut self, records: Vec<MediaRecord>) {
        info!(count = records.len(), "record set replaced");
        self.records = records;
    }

    /// Overlay user data onto hydrated records. Paths unknown to the
    /// library are skipped; this runs exactly once per hydration.
    pub fn apply_user_data(&mut self, data: &UserDataPayload) {
        let favorites: BTreeSet<&str> = data.favorites.iter().map(String::as_str).collect();
        let vaulted: BTreeSet<&str> = data.vaulted.iter().map(String::as_str).collect();
        for record in &mut self.records {
            record.favorite = favorites.contains(record.path.as_str());
            record.hidden = vaulted.contains(record.path.as_str());
            if let Some(tags) = data.tags.get(&record.path) {
                record.tags = tags.iter().cloned().collect();
            }
        }
    }

    fn find_mut(&mut self, path: &str) -> Option<&mut MediaRecord> {
        self.records.iter_mut().find(|record| record.path == path)
    }

    /// Flip the favorite flag. A path no longer present is a no-op; returns
    /// whether anything changed.
    pub fn toggle_favorite(&mut self, path: &str, queue: &mut WriteQueue) -> bool {
        match self.find_mut(path) {
            Some(record) => {
                record.favorite = !record.favorite;
                queue.push(PendingWrite::ToggleFavorite {
                    path: path.to_string(),
                    state: record.favorite,
                });
                true
            }
            None => {
                debug!(path, "favorite toggle for a path no longer present");
                false
            }
        }
    }

    /// Flip the vault flag, same contract as `toggle_favorite`.
    pub fn toggle_hidden(&mut self, path: &str, queue: &mut WriteQueue) -> bool {
        match self.find_mut(path) {
            Some(record) => {
                record.hidden = !record.hidden;
                queue.push(PendingWrite::ToggleHidden {
                    path: path.to_string(),
                    state: record.hidden,
                });
                true
            }
            None => {
                debug!(path, "vault toggle for a path no longer present");
                false
            }
        }
    }

    /// Replace a record's tag set.
    pub fn set_tags(
        &mut self,
        path: &str,
        tags: BTreeSet<String>,
        queue: &mut WriteQueue,
    ) -> bool {
        match self.find_mut(path) {
            Some(record) => {
                queue.push(PendingWrite::SetTags {
                    path: path.to_string(),
                    tags: tags.iter().cloned().collect(),
                });
                record.tags = tags;
                true
            }
            None => {
                debug!(path, "tag update for a path no longer present");
                false
            }
        }
    }
}
