//! The active filter set read by the predicate engine on every pipeline run.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::paths;
use crate::record::{MediaRecord, QualityStatus};

/// Top-level view mode. Changes which base predicate applies before all
/// other filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workspace {
    #[default]
    Lobby,
    Vault,
    Favorites,
    /// Original/optimized pair review. Runs its own pipeline.
    Review,
    /// Duplicate inspection, fed by the external duplicate service.
    Duplicates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(QualityStatus),
    /// Re-encoded output files, recognized by path convention.
    OptimizedFiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBucket {
    #[default]
    All,
    Day,
    Week,
    Month,
}

impl DateBucket {
    /// Maximum record age in seconds, None for no constraint.
    pub fn max_age_secs(self) -> Option<f64> {
        match self {
            DateBucket::All => None,
            DateBucket::Day => Some(86_400.0),
            DateBucket::Week => Some(604_800.0),
            DateBucket::Month => Some(2_592_000.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Bitrate,
    #[default]
    Size,
    Name,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    Include,
    Exclude,
}

/// One active tag constraint. Include demands the tag is present, Exclude
/// demands it is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelector {
    pub name: String,
    pub mode: TagMode,
}

impl TagSelector {
    pub fn include(name: impl Into<String>) -> Self {
        Self { name: name.into(), mode: TagMode::Include }
    }

    pub fn exclude(name: impl Into<String>) -> Self {
        Self { name: name.into(), mode: TagMode::Exclude }
    }
}

/// Sensitive-content screen applied before every workspace predicate.
#[derive(Debug, Clone)]
pub struct SafeMode {
    pub enabled: bool,
    /// Lower-cased tag names.
    sensitive_tags: BTreeSet<String>,
    /// Normalized, lower-cased directory prefixes.
    sensitive_dirs: Vec<String>,
}

impl Default for SafeMode {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitive_tags: ["nsfw", "adult", "18+"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            sensitive_dirs: Vec::new(),
        }
    }
}

impl SafeMode {
    /// Replace the configured tag list and directory prefixes. Inputs are
    /// normalized here so the per-record check stays cheap.
    pub fn configure<T, D>(&mut self, tags: T, dirs: D)
    where
        T: IntoIterator<Item = String>,
        D: IntoIterator<Item = String>,
    {
        self.sensitive_tags = tags.into_iter().map(|t| t.to_lowercase()).collect();
        self.sensitive_dirs = dirs
            .into_iter()
            .map(|d| paths::normalize(&d).to_lowercase())
            .collect();
    }

    pub fn is_sensitive(&self, record: &MediaRecord) -> bool {
        if record
            .tags
            .iter()
            .any(|tag| self.sensitive_tags.contains(&tag.to_lowercase()))
        {
            return true;
        }
        if !self.sensitive_dirs.is_empty() {
            let path = paths::normalize(&record.path).to_lowercase();
            if self
                .sensitive_dirs
                .iter()
                .any(|dir| path.starts_with(dir.as_str()))
            {
                return true;
            }
        }
        false
    }
}

/// A named, reusable predicate authored outside the engine and consumed
/// as-is.
#[derive(Clone)]
pub struct SmartCollection {
    pub name: String,
    predicate: Arc<dyn Fn(&MediaRecord) -> bool + Send + Sync>,
}

impl SmartCollection {
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&MediaRecord) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self { name: name.into(), predicate: Arc::new(predicate) }
    }

    pub fn matches(&self, record: &MediaRecord) -> bool {
        (self.predicate)(record)
    }
}

impl fmt::Debug for SmartCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartCollection")
            .field("name", &self.name)
            .finish()
    }
}

/// Everything the predicate engine reads. Mutated only through the state
/// reducer; never persisted directly.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub workspace: Workspace,
    pub status: StatusFilter,
    pub codec: Option<String>,
    /// Exact parent-directory match, original separator style.
    pub folder: Option<String>,
    pub search: Option<String>,
    pub date: DateBucket,
    pub size_min_mb: Option<f64>,
    pub size_max_mb: Option<f64>,
    pub tags: Vec<TagSelector>,
    pub untagged_only: bool,
    pub smart: Option<SmartCollection>,
    pub safe_mode: SafeMode,
}

impl FilterCriteria {
    /// Drop every narrowing filter while keeping workspace and safe-mode
    /// configuration.
    pub fn clear_filters(&mut self) {
        self.status = StatusFilter::All;
        self.codec = None;
        self.folder = None;
        self.search = None;
        self.date = DateBucket::All;
        self.size_min_mb = None;
        self.size_max_mb = None;
        self.tags.clear();
        self.untagged_only = false;
        self.smart = None;
    }
}
