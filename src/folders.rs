//! Virtual folder tree derived from flat record paths.
//!
//! The data model has no real directory tree, only path strings, so the
//! browser rebuilds its folder listing from whatever records survived
//! filtering. Counts and sizes therefore always reflect the current filter,
//! and nothing is cached between calls.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::paths;
use crate::record::MediaRecord;

/// Thumbnails attached per folder card.
const MAX_FOLDER_THUMBS: usize = 4;

/// One folder entry in the browser, aggregated over every record at or
/// below it.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    /// Display path, original separator style.
    pub path: String,
    pub name: String,
    pub count: usize,
    pub size_mb: f64,
    pub has_subfolders: bool,
    pub thumbnails: Vec<String>,
}

/// One breadcrumb entry. `path == None` is the synthetic "All Folders"
/// root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub path: Option<String>,
    pub label: String,
}

/// Per-directory accumulation keyed by normalized parent path.
struct DirStats {
    /// First-seen original spelling of the directory.
    display: String,
    /// Position of the first record observed at this directory.
    first_seq: usize,
    count: usize,
    size_mb: f64,
    /// (filtered-order sequence, thumb ref), at most MAX_FOLDER_THUMBS.
    thumbs: Vec<(usize, String)>,
}

fn group_by_dir(records: &[&MediaRecord]) -> HashMap<String, DirStats> {
    let mut dirs: HashMap<String, DirStats> = HashMap::new();
    for (seq, record) in records.iter().enumerate() {
        let display = record.parent_dir();
        let key = paths::normalize(display);
        let entry = dirs.entry(key).or_insert_with(|| DirStats {
            display: display.to_string(),
            first_seq: seq,
            count: 0,
            size_mb: 0.0,
            thumbs: Vec::new(),
        });
        entry.count += 1;
        entry.size_mb += record.size_mb;
        if entry.thumbs.len() < MAX_FOLDER_THUMBS {
            if let Some(thumb) = &record.thumb_ref {
                entry.thumbs.push((seq, thumb.clone()));
            }
        }
    }
    dirs
}

/// Earliest thumbnails across the directories making up one folder node.
fn merge_thumbs(candidates: &mut Vec<(usize, String)>) -> Vec<String> {
    candidates.sort_by_key(|(seq, _)| *seq);
    candidates
        .iter()
        .take(MAX_FOLDER_THUMBS)
        .map(|(_, thumb)| thumb.clone())
        .collect()
}

fn sort_folders(nodes: &mut [FolderNode]) {
    nodes.sort_by(|a, b| {
        b.size_mb
            .partial_cmp(&a.size_mb)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// List the folders visible at `parent` (None = root level), scoped to the
/// given record set.
pub fn subfolders_at(records: &[&MediaRecord], parent: Option<&str>) -> Vec<FolderNode> {
    let dirs = group_by_dir(records);
    let mut nodes = match parent {
        None => root_folders(&dirs),
        Some(parent) => child_folders(&dirs, parent),
    };
    sort_folders(&mut nodes);
    nodes
}

/// Root folders: observed directories not nested under any other observed
/// directory, each aggregated with all of its descendants.
fn root_folders(dirs: &HashMap<String, DirStats>) -> Vec<FolderNode> {
    let mut nodes = Vec::new();
    for (key, stats) in dirs {
        let nested = dirs
            .keys()
            .any(|other| paths::is_descendant(key, other));
        if nested {
            continue;
        }

        let mut count = stats.count;
        let mut size_mb = stats.size_mb;
        let mut has_subfolders = false;
        let mut thumbs = stats.thumbs.clone();
        for (other_key, other_stats) in dirs {
            if paths::is_descendant(other_key, key) {
                has_subfolders = true;
                count += other_stats.count;
                size_mb += other_stats.size_mb;
                thumbs.extend(other_stats.thumbs.iter().cloned());
            }
        }

        nodes.push(FolderNode {
            path: stats.display.clone(),
            name: display_name(&stats.display),
            count,
            size_mb,
            has_subfolders,
            thumbnails: merge_thumbs(&mut thumbs),
        });
    }
    nodes
}

/// Direct children of `parent`: one node per immediate next segment,
/// aggregated over every observed directory behind that segment.
fn child_folders(dirs: &HashMap<String, DirStats>, parent: &str) -> Vec<FolderNode> {
    let parent_norm = paths::normalize(parent);

    struct ChildAgg {
        display: String,
        display_seq: usize,
        count: usize,
        size_mb: f64,
        has_subfolders: bool,
        thumbs: Vec<(usize, String)>,
    }
    let mut children: HashMap<String, ChildAgg> = HashMap::new();

    for (key, stats) in dirs {
        if !paths::is_descendant(key, &parent_norm) {
            continue;
        }
        let remainder = &key[parent_norm.len() + 1..];
        let (segment, deeper) = match remainder.split_once('/') {
            Some((segment, _)) => (segment, true),
            None => (remainder, false),
        };
        let child_norm_len = parent_norm.len() + 1 + segment.len();
        let entry = children.entry(key[..child_norm_len].to_string()).or_insert_with(|| {
            ChildAgg {
                // Same byte length as the normalized form, so the slice is
                // the original spelling of the child path.
                display: stats.display[..child_norm_len].to_string(),
                display_seq: stats.first_seq,
                count: 0,
                size_mb: 0.0,
                has_subfolders: false,
                thumbs: Vec::new(),
            }
        });
        // Earliest-observed directory decides the display spelling.
        if stats.first_seq < entry.display_seq {
            entry.display = stats.display[..child_norm_len].to_string();
            entry.display_seq = stats.first_seq;
        }
        entry.count += stats.count;
        entry.size_mb += stats.size_mb;
        entry.has_subfolders |= deeper;
        entry.thumbs.extend(stats.thumbs.iter().cloned());
    }

    children
        .into_values()
        .map(|mut child| FolderNode {
            name: display_name(&child.display),
            path: child.display.clone(),
            count: child.count,
            size_mb: child.size_mb,
            has_subfolders: child.has_subfolders,
            thumbnails: merge_thumbs(&mut child.thumbs),
        })
        .collect()
}

fn display_name(dir: &str) -> String {
    let label = paths::dir_label(dir);
    if label.is_empty() {
        dir.to_string()
    } else {
        label.to_string()
    }
}

/// Records living at or below `parent` (None = everything).
pub fn records_under<'a>(
    records: &[&'a MediaRecord],
    parent: Option<&str>,
) -> Vec<&'a MediaRecord> {
    match parent {
        None => records.to_vec(),
        Some(parent) => {
            let parent_norm = paths::normalize(parent);
            records
                .iter()
                .copied()
                .filter(|record| {
                    let dir = paths::normalize(record.parent_dir());
                    dir == parent_norm || paths::is_descendant(&dir, &parent_norm)
                })
                .collect()
        }
    }
}

/// Breadcrumb trail for the current browse path, starting from the
/// synthetic "All Folders" entry and walking segment by segment from the
/// containing root folder.
pub fn breadcrumbs(records: &[&MediaRecord], current: Option<&str>) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb { path: None, label: "All Folders".to_string() }];
    let Some(current) = current else {
        return crumbs;
    };
    let current_norm = paths::normalize(current);

    let roots = subfolders_at(records, None);
    let root = roots.iter().find(|root| {
        let root_norm = paths::normalize(&root.path);
        root_norm == current_norm || paths::is_descendant(&current_norm, &root_norm)
    });
    let Some(root) = root else {
        // Path outside every known root; show it as a single crumb.
        crumbs.push(Crumb {
            path: Some(current.to_string()),
            label: display_name(current),
        });
        return crumbs;
    };

    crumbs.push(Crumb { path: Some(root.path.clone()), label: root.name.clone() });

    let root_norm_len = paths::normalize(&root.path).len();
    if current_norm.len() > root_norm_len {
        let mut end = root_norm_len;
        for segment in current_norm[root_norm_len + 1..].split('/') {
            end += 1 + segment.len();
            crumbs.push(Crumb {
                path: Some(current[..end].to_string()),
                label: segment.to_string(),
            });
        }
    }
    crumbs
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

    #[test]
    fn test_root_folder_aggregates_descendants() {
        let a = video("/a/x.mp4", 10.0);
        let b = video("/a/b/y.mp4", 20.0);
        let refs = vec![&a, &b];
        let roots = subfolders_at(&refs, None);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].path, "/a");
        assert_eq!(roots[0].count, 2);
        assert!((roots[0].size_mb - 30.0).abs() < 1e-9);
        assert!(roots[0].has_subfolders);
    }

    #[test]
    fn test_sibling_roots_do_not_merge() {
        let a = video("/alpha/x.mp4", 10.0);
        let b = video("/alphabet/y.mp4", 20.0);
        let refs = vec![&a, &b];
        let roots = subfolders_at(&refs, None);
        assert_eq!(roots.len(), 2);
        assert!(roots.iter().all(|r| !r.has_subfolders));
    }

    #[test]
    fn test_child_listing_groups_by_immediate_segment() {
        let a = video("/lib/shows/s1/e1.mkv", 10.0);
        let b = video("/lib/shows/s1/e2.mkv", 12.0);
        let c = video("/lib/shows/s2/deep/e1.mkv", 7.0);
        let d = video("/lib/movies/m.mkv", 30.0);
        let refs = vec![&a, &b, &c, &d];

        let children = subfolders_at(&refs, Some("/lib"));
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].path, "/lib/movies");
        assert_eq!(children[0].count, 1);
        assert!(!children[0].has_subfolders);
        assert_eq!(children[1].path, "/lib/shows");
        assert_eq!(children[1].count, 3);
        assert!(children[1].has_subfolders);

        let shows = subfolders_at(&refs, Some("/lib/shows"));
        assert_eq!(shows.len(), 2);
        let s2 = shows.iter().find(|n| n.name == "s2").expect("s2 listed");
        assert!(s2.has_subfolders);
        assert_eq!(s2.count, 1);
    }

    #[test]
    fn test_counts_conserve_records() {
        let files = [
            "/lib/shows/s1/e1.mkv",
            "/lib/shows/s1/e2.mkv",
            "/lib/shows/s2/e1.mkv",
            "/lib/movies/m.mkv",
            "/other/z.mp4",
        ];
        let records: Vec<MediaRecord> = files.iter().map(|p| video(p, 1.0)).collect();
        let refs: Vec<&MediaRecord> = records.iter().collect();

        let roots = subfolders_at(&refs, None);
        let total: usize = roots.iter().map(|n| n.count).sum();
        assert_eq!(total, records_under(&refs, None).len());

        let children = subfolders_at(&refs, Some("/lib"));
        let child_total: usize = children.iter().map(|n| n.count).sum();
        assert_eq!(child_total, records_under(&refs, Some("/lib")).len());
    }

    #[test]
    fn test_mixed_separators_group_and_keep_display_style() {
        let a = video("D:\\media\\clips\\one.mp4", 5.0);
        let b = video("D:/media/clips/two.mp4", 5.0);
        let refs = vec![&a, &b];
        let roots = subfolders_at(&refs, None);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].count, 2);
        // First record observed sets the display spelling.
        assert_eq!(roots[0].path, "D:\\media\\clips");

        let under = records_under(&refs, Some("D:/media"));
        assert_eq!(under.len(), 2);
    }

    #[test]
    fn test_separatorless_path_becomes_its_own_root() {
        let stray = video("stray.mp4", 1.0);
        let a = video("/a/x.mp4", 1.0);
        let refs = vec![&stray, &a];
        let roots = subfolders_at(&refs, None);
        assert_eq!(roots.len(), 2);
        let total: usize = roots.iter().map(|n| n.count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_thumbnails_take_first_four_in_filtered_order() {
        // One record directly in /a makes it the single root; the rest sit
        // in alternating subfolders so merging has to respect filter order.
        let mut records = vec![video("/a/base.mp4", 1.0)];
        for i in 0..6 {
            let mut r = video(&format!("/a/sub{}/v{}.mp4", i % 2, i), 1.0);
            r.thumb_ref = Some(format!("thumb-{}", i));
            records.push(r);
        }
        let refs: Vec<&MediaRecord> = records.iter().collect();
        let roots = subfolders_at(&refs, None);
        assert_eq!(roots.len(), 1);
        assert_eq!(
            roots[0].thumbnails,
            vec!["thumb-0", "thumb-1", "thumb-2", "thumb-3"]
        );
    }

    #[test]
    fn test_breadcrumbs_walk_from_root() {
        let a = video("/lib/shows/s1/e1.mkv", 1.0);
        let refs = vec![&a];
        let crumbs = breadcrumbs(&refs, Some("/lib/shows/s1"));
        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["All Folders", "s1"]);
        assert_eq!(crumbs[0].path, None);
        assert_eq!(crumbs[1].path.as_deref(), Some("/lib/shows/s1"));
    }

    #[test]
    fn test_breadcrumbs_below_root_extend_per_segment() {
        let a = video("/lib/shows/s1/e1.mkv", 1.0);
        let b = video("/lib/intro.mp4", 1.0);
        let refs = vec![&a, &b];
        // "/lib" is observed directly, so it is the containing root folder.
        let crumbs = breadcrumbs(&refs, Some("/lib/shows/s1"));
        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["All Folders", "lib", "shows", "s1"]);
        assert_eq!(crumbs[2].path.as_deref(), Some("/lib/shows"));
        assert_eq!(crumbs[3].path.as_deref(), Some("/lib/shows/s1"));
    }

    #[test]
    fn test_rebuild_reflects_current_filter_only() {
        let a = video("/a/x.mp4", 10.0);
        let b = video("/a/y.mp4", 20.0);
        let both = vec![&a, &b];
        let one = vec![&a];
        assert_eq!(subfolders_at(&both, None)[0].count, 2);
        assert_eq!(subfolders_at(&one, None)[0].count, 1);
    }
}
