//! View projection: turn pipeline output into renderer-agnostic data.
//!
//! Everything here is plain values a renderer can paint however it likes —
//! cards for the grid, tiles for the treemap, rows for the review
//! workspace. No drawing-target types appear on this boundary.

use crate::criteria::Workspace;
use crate::drilldown::TreemapTile;
use crate::filter::{self, FilterTally};
use crate::folders::{self, Crumb};
use crate::pairing;
use crate::record::{MediaRecord, MediaType, QualityStatus};
use crate::sort;
use crate::state::{AppState, LayoutMode};

#[derive(Debug, Clone, PartialEq)]
pub struct FolderCard {
    pub path: String,
    pub name: String,
    pub count: usize,
    pub size_mb: f64,
    pub has_subfolders: bool,
    pub thumbnails: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaCard {
    pub path: String,
    pub name: String,
    pub size_mb: f64,
    pub media_type: MediaType,
    pub status: QualityStatus,
    pub favorite: bool,
    pub hidden: bool,
    pub tags: Vec<String>,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairRow {
    pub original_path: String,
    pub optimized_path: String,
    pub original_mb: f64,
    pub optimized_mb: f64,
    /// Optimized minus original; negative when space was saved.
    pub diff_mb: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    Grid { folders: Vec<FolderCard>, files: Vec<MediaCard> },
    Treemap { tiles: Vec<TreemapTile> },
    Pairs { rows: Vec<PairRow> },
    Empty { message: String },
}

/// One frame's worth of render input.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub breadcrumbs: Vec<Crumb>,
    /// Count/size of the set behind the body. For the review workspace the
    /// count is the number of pairs and the size is the summed delta.
    pub tally: FilterTally,
    pub body: ViewBody,
}

fn media_card(record: &MediaRecord) -> MediaCard {
    MediaCard {
        path: record.path.clone(),
        name: record.file_name().to_string(),
        size_mb: record.size_mb,
        media_type: record.media_type,
        status: record.status,
        favorite: record.favorite,
        hidden: record.hidden,
        tags: record.tags.iter().cloned().collect(),
        thumb: record.thumb_ref.clone(),
    }
}

fn folder_card(node: folders::FolderNode) -> FolderCard {
    FolderCard {
        path: node.path,
        name: node.name,
        count: node.count,
        size_mb: node.size_mb,
        has_subfolders: node.has_subfolders,
        thumbnails: node.thumbnails,
    }
}

/// Project the current state over the record set. Pure; `now` is epoch
/// seconds.
pub fn project(records: &[MediaRecord], state: &AppState, now: f64) -> ViewModel {
    if state.criteria.workspace == Workspace::Review {
        return project_review(records, state);
    }

    let (mut filtered, tally) = filter::filter_records(records, &state.criteria, now);
    sort::sort_records(&mut filtered, state.sort);

    let current = match state.layout {
        LayoutMode::Grid => state.browse_folder.as_deref(),
        LayoutMode::Treemap => state.treemap.current_folder(),
    };
    let breadcrumbs = folders::breadcrumbs(&filtered, current);

    let body = match state.layout {
        LayoutMode::Grid => {
            if filtered.is_empty() {
                ViewBody::Empty { message: "No media match the current filters".to_string() }
            } else {
                let folder_cards: Vec<FolderCard> =
                    folders::subfolders_at(&filtered, state.browse_folder.as_deref())
                        .into_iter()
                        .map(folder_card)
                        .collect();
                let files: Vec<MediaCard> = match state.browse_folder.as_deref() {
                    // Root level lists folders only; files show up once a
                    // folder is opened.
                    None => Vec::new(),
                    Some(folder) => filtered
                        .iter()
                        .filter(|r| r.parent_dir() == folder)
                        .map(|r| media_card(r))
                        .collect(),
                };
                ViewBody::Grid { folders: folder_cards, files }
            }
        }
        LayoutMode::Treemap => {
            let tiles = state.treemap.tiles().to_vec();
            if tiles.is_empty() {
                ViewBody::Empty { message: "Nothing to map here".to_string() }
            } else {
                ViewBody::Treemap { tiles }
            }
        }
    };

    ViewModel { breadcrumbs, tally, body }
}

fn project_review(records: &[MediaRecord], state: &AppState) -> ViewModel {
    let baseline = filter::baseline_records(records, &state.criteria);
    let pairs = pairing::pair_records(&baseline);

    let rows: Vec<PairRow> = pairs
        .iter()
        .map(|pair| PairRow {
            original_path: pair.original.path.clone(),
            optimized_path: pair.optimized.path.clone(),
            original_mb: pair.original.size_mb,
            optimized_mb: pair.optimized.size_mb,
            diff_mb: pair.diff_mb,
        })
        .collect();

    let tally = FilterTally {
        count: rows.len(),
        total_size_mb: rows.iter().map(|row| row.diff_mb).sum(),
    };
    let body = if rows.is_empty() {
        ViewBody::Empty { message: "No original/optimized pairs found".to_string() }
    } else {
        ViewBody::Pairs { rows }
    };

    ViewModel {
        breadcrumbs: folders::breadcrumbs(&baseline, None),
        tally,
        body,
    }
}
