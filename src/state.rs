//! Application state as an immutable snapshot, advanced only through
//! `reduce`.
//!
//! Every user-facing mutation becomes an `Action`; the reducer clones the
//! previous snapshot, applies the change, re-filters, and re-lays the
//! treemap out before handing the next snapshot back. Renders read
//! snapshots and never mutate.

use std::time::{Duration, Instant};

use crate::criteria::{
    DateBucket, FilterCriteria, SmartCollection, SortKey, StatusFilter, TagSelector, Workspace,
};
use crate::drilldown::TreemapView;
use crate::filter;
use crate::record::MediaRecord;
use crate::treemap::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Grid,
    Treemap,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub criteria: FilterCriteria,
    pub sort: SortKey,
    pub layout: LayoutMode,
    /// Folder-browser position in the grid layout.
    pub browse_folder: Option<String>,
    pub treemap: TreemapView,
}

impl AppState {
    pub fn new(treemap_bounds: Rect) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            sort: SortKey::default(),
            layout: LayoutMode::default(),
            browse_folder: None,
            treemap: TreemapView::new(treemap_bounds, false),
        }
    }
}

/// Every way the state can move.
#[derive(Debug, Clone)]
pub enum Action {
    SetWorkspace(Workspace),
    SetStatusFilter(StatusFilter),
    SetCodecFilter(Option<String>),
    /// Search text, already debounced by the caller.
    SetSearch(Option<String>),
    SetFolderFilter(Option<String>),
    SetSizeRange { min_mb: Option<f64>, max_mb: Option<f64> },
    SetDateBucket(DateBucket),
    AddTag(TagSelector),
    RemoveTag(String),
    SetUntaggedOnly(bool),
    SetSmartCollection(Option<SmartCollection>),
    SetSafeMode(bool),
    SetSortKey(SortKey),
    SetLayout(LayoutMode),
    /// Folder-browser navigation; None returns to the root listing.
    BrowseTo(Option<String>),
    DrillInto(String),
    DrillOut,
    ResetDrill,
    SetTreemapScale { use_log: bool },
    /// Canvas dimensions, already debounced by the caller.
    ResizeTreemap { width: f32, height: f32 },
    ClearFilters,
    /// Re-run the pipeline without changing any criteria, e.g. after a
    /// record toggle mutated the store in place.
    Refresh,
}

fn apply(state: &mut AppState, action: &Action) {
    match action {
        Action::SetWorkspace(workspace) => {
            state.criteria.workspace = *workspace;
            state.browse_folder = None;
        }
        Action::SetStatusFilter(status) => state.criteria.status = *status,
        Action::SetCodecFilter(codec) => state.criteria.codec = codec.clone(),
        Action::SetSearch(search) => {
            state.criteria.search = search.as_ref().filter(|s| !s.is_empty()).cloned();
        }
        Action::SetFolderFilter(folder) => state.criteria.folder = folder.clone(),
        Action::SetSizeRange { min_mb, max_mb } => {
            state.criteria.size_min_mb = *min_mb;
            state.criteria.size_max_mb = *max_mb;
        }
        Action::SetDateBucket(bucket) => state.criteria.date = *bucket,
        Action::AddTag(selector) => {
            state.criteria.tags.retain(|t| t.name != selector.name);
            state.criteria.tags.push(selector.clone());
        }
        Action::RemoveTag(name) => state.criteria.tags.retain(|t| &t.name != name),
        Action::SetUntaggedOnly(untagged) => state.criteria.untagged_only = *untagged,
        Action::SetSmartCollection(smart) => state.criteria.smart = smart.clone(),
        Action::SetSafeMode(enabled) => state.criteria.safe_mode.enabled = *enabled,
        Action::SetSortKey(key) => state.sort = *key,
        Action::SetLayout(layout) => state.layout = *layout,
        Action::BrowseTo(folder) => state.browse_folder = folder.clone(),
        Action::SetTreemapScale { use_log } => state.treemap.set_use_log(*use_log),
        Action::ResizeTreemap { width, height } => {
            state.treemap.set_bounds(Rect::new(0.0, 0.0, *width, *height));
        }
        Action::ClearFilters => state.criteria.clear_filters(),
        Action::Refresh => {}
        // Drill moves happen after re-filtering, below.
        Action::DrillInto(_) | Action::DrillOut | Action::ResetDrill => {}
    }
}

/// The single state-update entry point: apply `action` to a copy of
/// `state`, re-run the filter pass, and re-lay the treemap out
/// synchronously.
pub fn reduce(state: &AppState, action: Action, records: &[MediaRecord], now: f64) -> AppState {
    let mut next = state.clone();
    apply(&mut next, &action);

    let (filtered, _tally) = filter::filter_records(records, &next.criteria, now);
    match &action {
        Action::DrillInto(path) => next.treemap.drill_into(path, &filtered),
        Action::DrillOut => next.treemap.drill_out(&filtered),
        Action::ResetDrill => next.treemap.reset(&filtered),
        _ => next.treemap.rebuild(&filtered),
    }
    next
}

/// Coalesces rapid submissions into one value after a quiet period.
///
/// Single-threaded and caller-polled: the event loop submits on every
/// keystroke and polls once per tick with an explicit clock, so there are
/// no timers and tests stay deterministic.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    /// Replace any pending value and restart the quiet period.
    pub fn submit(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.duration_since(*at) >= self.quiet => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MediaType;

    fn video(path: &str, size_mb: f64) -> MediaRecord {
        let mut record = MediaRecord::new(path, MediaType::Video);
        record.size_mb = size_mb;
        record
    }

    fn initial() -> AppState {
        AppState::new(Rect::new(0.0, 0.0, 100.0, 50.0))
    }

    #[test]
    fn test_reduce_leaves_previous_snapshot_untouched() {
        let records = vec![video("/a/x.mp4", 10.0)];
        let before = initial();
        let after = reduce(
            &before,
            Action::SetSearch(Some("x".to_string())),
            &records,
            0.0,
        );
        assert!(before.criteria.search.is_none());
        assert_eq!(after.criteria.search.as_deref(), Some("x"));
    }

    #[test]
    fn test_add_tag_replaces_same_name() {
        let records = Vec::new();
        let mut state = initial();
        state = reduce(&state, Action::AddTag(TagSelector::include("trip")), &records, 0.0);
        state = reduce(&state, Action::AddTag(TagSelector::exclude("trip")), &records, 0.0);
        assert_eq!(state.criteria.tags.len(), 1);
        assert_eq!(state.criteria.tags[0], TagSelector::exclude("trip"));
    }

    #[test]
    fn test_empty_search_clears_filter() {
        let records = Vec::new();
        let state = reduce(
            &initial(),
            Action::SetSearch(Some(String::new())),
            &records,
            0.0,
        );
        assert!(state.criteria.search.is_none());
    }

    #[test]
    fn test_drill_actions_drive_treemap() {
        let records = vec![video("/a/x.mp4", 10.0), video("/b/y.mp4", 20.0)];
        let mut state = reduce(
            &initial(),
            Action::SetLayout(LayoutMode::Treemap),
            &records,
            0.0,
        );
        assert_eq!(state.treemap.tiles().len(), 2);

        state = reduce(&state, Action::DrillInto("/a".to_string()), &records, 0.0);
        assert_eq!(state.treemap.current_folder(), Some("/a"));
        assert_eq!(state.treemap.tiles().len(), 1);

        state = reduce(&state, Action::DrillOut, &records, 0.0);
        assert_eq!(state.treemap.current_folder(), None);
        assert_eq!(state.treemap.tiles().len(), 2);
    }

    #[test]
    fn test_filter_change_relayouts_treemap() {
        let records = vec![video("/a/x.mp4", 10.0), video("/b/y.mp4", 200.0)];
        let mut state = reduce(
            &initial(),
            Action::SetLayout(LayoutMode::Treemap),
            &records,
            0.0,
        );
        assert_eq!(state.treemap.tiles().len(), 2);

        state = reduce(
            &state,
            Action::SetSizeRange { min_mb: Some(100.0), max_mb: None },
            &records,
            0.0,
        );
        assert_eq!(state.treemap.tiles().len(), 1);
    }

    #[test]
    fn test_workspace_change_resets_browse_position() {
        let records = Vec::new();
        let mut state = reduce(
            &initial(),
            Action::BrowseTo(Some("/a".to_string())),
            &records,
            0.0,
        );
        assert!(state.browse_folder.is_some());
        state = reduce(&state, Action::SetWorkspace(Workspace::Favorites), &records, 0.0);
        assert!(state.browse_folder.is_none());
    }

    #[test]
    fn test_debouncer_coalesces_rapid_submissions() {
        let quiet = Duration::from_millis(250);
        let mut debouncer = Debouncer::new(quiet);
        let t0 = Instant::now();

        debouncer.submit("a", t0);
        debouncer.submit("ab", t0 + Duration::from_millis(100));
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(200)), None);

        let fired = debouncer.poll(t0 + Duration::from_millis(400));
        assert_eq!(fired, Some("ab"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(900)), None);
    }
}
