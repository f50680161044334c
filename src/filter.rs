//! The predicate engine: one record against the active criteria.
//!
//! Predicates run in a fixed order and fail fast; the first miss rejects the
//! record. Order matters for the workspace-bypass rules, not for
//! correctness of the conjunction.

use crate::criteria::{FilterCriteria, StatusFilter, TagMode, Workspace};
use crate::record::MediaRecord;

/// Running count and size accumulated during the filter pass, for the
/// header display. Produced in the same traversal as the filtering itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterTally {
    pub count: usize,
    pub total_size_mb: f64,
}

/// Evaluate one record. Pure and total; `now` is epoch seconds.
pub fn matches(record: &MediaRecord, criteria: &FilterCriteria, now: f64) -> bool {
    if let Some(smart) = &criteria.smart {
        if !smart.matches(record) {
            return false;
        }
    }

    if criteria.safe_mode.enabled && criteria.safe_mode.is_sensitive(record) {
        return false;
    }

    match criteria.workspace {
        Workspace::Lobby => {
            if record.hidden {
                return false;
            }
        }
        Workspace::Vault => {
            if !record.hidden {
                return false;
            }
        }
        Workspace::Favorites => {
            if !record.favorite {
                return false;
            }
        }
        // These run dedicated pipelines and skip the workspace predicate.
        Workspace::Review | Workspace::Duplicates => {}
    }

    match criteria.status {
        StatusFilter::All => {}
        StatusFilter::OptimizedFiles => {
            if !(record.path.contains("_opt") || record.path.contains("_trim")) {
                return false;
            }
        }
        StatusFilter::Only(status) => {
            if record.status != status {
                return false;
            }
        }
    }

    if let Some(codec) = &criteria.codec {
        if !record.codec_or_unknown().contains(codec.as_str()) {
            return false;
        }
    }

    if let Some(query) = &criteria.search {
        let query = query.to_lowercase();
        let name = record.file_name().to_lowercase();
        let full = record.path.to_lowercase();
        if !name.contains(&query) && !full.contains(&query) {
            return false;
        }
    }

    if let Some(folder) = &criteria.folder {
        if record.parent_dir() != folder {
            return false;
        }
    }

    if let Some(min) = criteria.size_min_mb {
        if record.size_mb < min {
            return false;
        }
    }
    if let Some(max) = criteria.size_max_mb {
        if record.size_mb > max {
            return false;
        }
    }

    if let Some(max_age) = criteria.date.max_age_secs() {
        if now - record.effective_date() > max_age {
            return false;
        }
    }

    if criteria.untagged_only {
        if !record.tags.is_empty() {
            return false;
        }
    } else {
        for selector in &criteria.tags {
            let present = record.tags.contains(&selector.name);
            match selector.mode {
                TagMode::Include => {
                    if !present {
                        return false;
                    }
                }
                TagMode::Exclude => {
                    if present {
                        return false;
                    }
                }
            }
        }
    }

    true
}

/// Filter the full record set, preserving order, tallying count and size in
/// the same pass.
pub fn filter_records<'a>(
    records: &'a [MediaRecord],
    criteria: &FilterCriteria,
    now: f64,
) -> (Vec<&'a MediaRecord>, FilterTally) {
    let mut kept = Vec::new();
    let mut tally = FilterTally::default();
    for record in records {
        if matches(record, criteria, now) {
            tally.count += 1;
            tally.total_size_mb += record.size_mb;
            kept.push(record);
        }
    }
    (kept, tally)
}

/// The pre-pass shared by the dedicated pipelines (review, duplicates):
/// only the smart-collection and sensitivity screens apply there.
pub fn baseline_records<'a>(
    records: &'a [MediaRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a MediaRecord> {
    records
        .iter()
        .filter(|record| {
            criteria.smart.as_ref().map_or(true, |smart| smart.matches(record))
                && !(criteria.safe_mode.enabled && criteria.safe_mode.is_sensitive(record))
        })
        .collect()
}
