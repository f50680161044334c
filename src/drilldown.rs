//! Treemap drill-down: the two-state navigation machine and the tile set it
//! keeps laid out.
//!
//! All folders are shown until a block is entered, then the files of that
//! one folder; backing out returns to the folder overview. The drill
//! mutators are the only way the state moves, and each re-runs the layout
//! synchronously against the record set it is handed.

use crate::folders;
use crate::record::{MediaRecord, QualityStatus};
use crate::treemap::{self, Rect};

/// Blocks narrower or shorter than this (in layout units) carry no label
/// text, so tiny tiles never grow illegible captions.
const MIN_LABEL_WIDTH: f32 = 12.0;
const MIN_LABEL_HEIGHT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreemapMode {
    AllFolders,
    FilesInFolder,
}

/// What clicking a tile should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileTarget {
    /// Drill into this folder.
    Folder(String),
    /// Open this record in the viewer.
    Record(String),
}

/// One rendered treemap tile with its presentation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapTile {
    pub rect: Rect,
    pub weight: f32,
    pub size_mb: f64,
    /// None when the block is too small to hold text.
    pub label: Option<String>,
    /// Share of HIGH-status records behind the tile; folder mode only.
    pub status_ratio: Option<f32>,
    pub target: TileTarget,
}

/// Drill-down state plus the tiles laid out for it.
#[derive(Debug, Clone)]
pub struct TreemapView {
    current_folder: Option<String>,
    pub use_log: bool,
    bounds: Rect,
    tiles: Vec<TreemapTile>,
}

impl TreemapView {
    pub fn new(bounds: Rect, use_log: bool) -> Self {
        Self { current_folder: None, use_log, bounds, tiles: Vec::new() }
    }

    pub fn mode(&self) -> TreemapMode {
        if self.current_folder.is_some() {
            TreemapMode::FilesInFolder
        } else {
            TreemapMode::AllFolders
        }
    }

    pub fn current_folder(&self) -> Option<&str> {
        self.current_folder.as_deref()
    }

    pub fn tiles(&self) -> &[TreemapTile] {
        &self.tiles
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Narrow focus to one folder's files.
    pub fn drill_into(&mut self, path: &str, records: &[&MediaRecord]) {
        self.current_folder = Some(path.to_string());
        self.rebuild(records);
    }

    /// Return to the all-folders overview.
    pub fn drill_out(&mut self, records: &[&MediaRecord]) {
        self.current_folder = None;
        self.rebuild(records);
    }

    pub fn reset(&mut self, records: &[&MediaRecord]) {
        self.current_folder = None;
        self.rebuild(records);
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn set_use_log(&mut self, use_log: bool) {
        self.use_log = use_log;
    }

    /// Re-run the layout for the current mode over the given (already
    /// filtered) records.
    pub fn rebuild(&mut self, records: &[&MediaRecord]) {
        self.tiles = match &self.current_folder {
            None => self.folder_tiles(records),
            Some(folder) => self.file_tiles(records, folder),
        };
    }

    fn folder_tiles(&self, records: &[&MediaRecord]) -> Vec<TreemapTile> {
        let nodes = folders::subfolders_at(records, None);
        let sizes: Vec<(usize, f64)> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (i, node.size_mb))
            .collect();
        let blocks = treemap::layout(&sizes, self.bounds, self.use_log);

        blocks
            .into_iter()
            .map(|block| {
                let node = &nodes[block.node];
                let under = folders::records_under(records, Some(&node.path));
                let high = under
                    .iter()
                    .filter(|r| r.status == QualityStatus::High)
                    .count();
                let ratio = if under.is_empty() {
                    0.0
                } else {
                    high as f32 / under.len() as f32
                };
                TreemapTile {
                    rect: block.rect,
                    weight: block.weight,
                    size_mb: node.size_mb,
                    label: eligible_label(&block.rect, &node.name),
                    status_ratio: Some(ratio),
                    target: TileTarget::Folder(node.path.clone()),
                }
            })
            .collect()
    }

    fn file_tiles(&self, records: &[&MediaRecord], folder: &str) -> Vec<TreemapTile> {
        let files = folders::records_under(records, Some(folder));
        let sizes: Vec<(usize, f64)> = files
            .iter()
            .enumerate()
            .map(|(i, record)| (i, record.size_mb))
            .collect();
        let blocks = treemap::layout(&sizes, self.bounds, self.use_log);

        blocks
            .into_iter()
            .map(|block| {
                let record = files[block.node];
                TreemapTile {
                    rect: block.rect,
                    weight: block.weight,
                    size_mb: record.size_mb,
                    label: eligible_label(&block.rect, record.file_name()),
                    status_ratio: None,
                    target: TileTarget::Record(record.path.clone()),
                }
            })
            .collect()
    }
}

fn eligible_label(rect: &Rect, text: &str) -> Option<String> {
    if rect.width >= MIN_LABEL_WIDTH && rect.height >= MIN_LABEL_HEIGHT {
        Some(text.to_string())
    } else {
        None
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

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 120.0, 40.0)
    }

    #[test]
    fn test_drill_cycle() {
        let a = video("/a/x.mp4", 60.0);
        let b = video("/a/sub/y.mp4", 20.0);
        let c = video("/b/z.mp4", 40.0);
        let refs = vec![&a, &b, &c];

        let mut view = TreemapView::new(bounds(), false);
        view.rebuild(&refs);
        assert_eq!(view.mode(), TreemapMode::AllFolders);
        assert_eq!(view.tiles().len(), 2);

        view.drill_into("/a", &refs);
        assert_eq!(view.mode(), TreemapMode::FilesInFolder);
        assert_eq!(view.current_folder(), Some("/a"));
        // Files under /a, recursively.
        assert_eq!(view.tiles().len(), 2);
        assert!(view
            .tiles()
            .iter()
            .all(|tile| matches!(tile.target, TileTarget::Record(_))));

        view.drill_out(&refs);
        assert_eq!(view.mode(), TreemapMode::AllFolders);
        assert_eq!(view.tiles().len(), 2);
    }

    #[test]
    fn test_folder_tiles_carry_status_ratio() {
        let mut high = video("/a/big.mkv", 75.0);
        high.status = QualityStatus::High;
        let ok = video("/a/small.mp4", 25.0);
        let refs = vec![&high, &ok];

        let mut view = TreemapView::new(bounds(), false);
        view.rebuild(&refs);
        assert_eq!(view.tiles().len(), 1);
        let ratio = view.tiles()[0].status_ratio.expect("folder mode has ratio");
        assert!((ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_record_set_lays_out_nothing() {
        let mut view = TreemapView::new(bounds(), false);
        view.rebuild(&[]);
        assert!(view.tiles().is_empty());

        view.drill_into("/missing", &[]);
        assert!(view.tiles().is_empty());
        // State still moved; backing out must work.
        view.drill_out(&[]);
        assert_eq!(view.mode(), TreemapMode::AllFolders);
    }

    #[test]
    fn test_tiny_blocks_get_no_label() {
        // One dominant file and one sliver in the same folder.
        let big = video("/a/big.mkv", 5000.0);
        let tiny = video("/a/tiny.mp4", 1.0);
        let refs = vec![&big, &tiny];

        let mut view = TreemapView::new(Rect::new(0.0, 0.0, 60.0, 4.0), false);
        view.drill_into("/a", &refs);
        let labels: Vec<bool> = view
            .tiles()
            .iter()
            .map(|tile| tile.label.is_some())
            .collect();
        assert!(labels.contains(&true));
        assert!(labels.contains(&false));
    }

    #[test]
    fn test_reset_returns_to_overview() {
        let a = video("/a/x.mp4", 10.0);
        let refs = vec![&a];
        let mut view = TreemapView::new(bounds(), false);
        view.drill_into("/a", &refs);
        view.reset(&refs);
        assert_eq!(view.mode(), TreemapMode::AllFolders);
        assert_eq!(view.current_folder(), None);
    }
}
