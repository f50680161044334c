//! Original/optimized pairing for the review workspace.
//!
//! Re-encoded outputs follow a filename convention: the source stem plus an
//! `_opt` or `_trim` suffix, in the same directory. There are no real IDs,
//! so the join runs entirely on path strings.

use std::collections::HashMap;

use crate::paths;
use crate::record::MediaRecord;

/// A matched source/output couple. Built fresh per pipeline run, never
/// stored.
#[derive(Debug, Clone, Copy)]
pub struct VirtualPair<'a> {
    pub original: &'a MediaRecord,
    pub optimized: &'a MediaRecord,
    /// Optimized minus original; negative when the re-encode saved space.
    pub diff_mb: f64,
}

const OPTIMIZED_SUFFIXES: [&str; 2] = ["_opt", "_trim"];

fn pair_key(record: &MediaRecord) -> String {
    format!(
        "{}|{}",
        paths::parent_dir(&record.path),
        paths::stem(&record.path)
    )
}

/// Group records into original/optimized pairs, sorted by the original's
/// path.
///
/// Two files sharing a directory and stem collapse onto one map key (last
/// record wins), and an optimized file with no sibling original is dropped
/// without complaint.
pub fn pair_records<'a>(records: &[&'a MediaRecord]) -> Vec<VirtualPair<'a>> {
    let mut by_key: HashMap<String, &'a MediaRecord> = HashMap::new();
    for record in records.iter().copied() {
        by_key.insert(pair_key(record), record);
    }

    let mut pairs = Vec::new();
    for optimized in by_key.values().copied() {
        let stem = paths::stem(&optimized.path);
        let Some(base) = OPTIMIZED_SUFFIXES
            .iter()
            .copied()
            .find_map(|suffix| stem.strip_suffix(suffix))
        else {
            continue;
        };
        let original_key = format!("{}|{}", paths::parent_dir(&optimized.path), base);
        if let Some(&original) = by_key.get(&original_key) {
            pairs.push(VirtualPair {
                original,
                optimized,
                diff_mb: optimized.size_mb - original.size_mb,
            });
        }
    }

    pairs.sort_by(|a, b| {
        a.original
            .path
            .cmp(&b.original.path)
            .then_with(|| a.optimized.path.cmp(&b.optimized.path))
    });
    pairs
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
    fn test_opt_suffix_pairs_with_sibling_original() {
        let original = video("/a/movie.mkv", 100.0);
        let optimized = video("/a/movie_opt.mp4", 40.0);
        let refs = vec![&original, &optimized];
        let pairs = pair_records(&refs);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].original.path, "/a/movie.mkv");
        assert_eq!(pairs[0].optimized.path, "/a/movie_opt.mp4");
        assert!((pairs[0].diff_mb + 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_pair_shares_directory_and_stem() {
        let original = video("/a/movie.mkv", 100.0);
        let elsewhere = video("/b/movie_opt.mp4", 40.0);
        let refs = vec![&original, &elsewhere];
        assert!(pair_records(&refs).is_empty());

        let trimmed = video("/a/movie_trim.mp4", 70.0);
        let refs = vec![&original, &trimmed];
        let pairs = pair_records(&refs);
        assert_eq!(pairs.len(), 1);
        let optimized_stem = paths::stem(&pairs[0].optimized.path);
        let original_stem = paths::stem(&pairs[0].original.path);
        assert_eq!(optimized_stem.strip_suffix("_trim"), Some(original_stem));
        assert_eq!(
            paths::parent_dir(&pairs[0].optimized.path),
            paths::parent_dir(&pairs[0].original.path)
        );
    }

    #[test]
    fn test_orphan_optimized_file_is_dropped() {
        let orphan = video("/a/lonely_opt.mp4", 12.0);
        let refs = vec![&orphan];
        assert!(pair_records(&refs).is_empty());
    }

    #[test]
    fn test_same_stem_different_extension_collides_last_wins() {
        let mkv = video("/a/movie.mkv", 100.0);
        let mp4 = video("/a/movie.mp4", 90.0);
        let optimized = video("/a/movie_opt.mp4", 40.0);
        let refs = vec![&mkv, &mp4, &optimized];
        let pairs = pair_records(&refs);
        assert_eq!(pairs.len(), 1);
        // The later record took the shared key.
        assert_eq!(pairs[0].original.path, "/a/movie.mp4");
        assert!((pairs[0].diff_mb + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_sorted_by_original_path() {
        let b_orig = video("/b/clip.mkv", 10.0);
        let b_opt = video("/b/clip_opt.mp4", 5.0);
        let a_orig = video("/a/clip.mkv", 10.0);
        let a_opt = video("/a/clip_opt.mp4", 5.0);
        let refs = vec![&b_orig, &b_opt, &a_orig, &a_opt];
        let pairs = pair_records(&refs);
        let order: Vec<&str> = pairs.iter().map(|p| p.original.path.as_str()).collect();
        assert_eq!(order, vec!["/a/clip.mkv", "/b/clip.mkv"]);
    }
}
