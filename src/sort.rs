//! Comparator selection for the filtered result set.

use std::cmp::Ordering;

use crate::criteria::SortKey;
use crate::record::MediaRecord;

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Stable in-place sort. Ties keep insertion order; there is no secondary
/// key.
pub fn sort_records(records: &mut [&MediaRecord], key: SortKey) {
    match key {
        SortKey::Bitrate => records.sort_by(|a, b| {
            descending(a.bitrate_mbps.unwrap_or(0.0), b.bitrate_mbps.unwrap_or(0.0))
        }),
        SortKey::Size => records.sort_by(|a, b| descending(a.size_mb, b.size_mb)),
        // Case-insensitive full-path compare stands in for locale collation.
        SortKey::Name => records.sort_by_cached_key(|r| r.path.to_lowercase()),
        SortKey::Date => records.sort_by(|a, b| descending(a.mtime, b.mtime)),
    }
}
