//! Local stand-in for the backend index: walk a directory and synthesize
//! media records from what sits on disk.
//!
//! Bitrate, duration and the HIGH/OK classification belong to the real
//! scanner service, so records produced here carry none of them; the
//! dashboard still gets a browsable library when no snapshot exists.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use jwalk::WalkDir;
use rayon::prelude::*;
use tracing::info;

use crate::error::ScanError;
use crate::record::{MediaRecord, MediaType};

const VIDEO_EXTENSIONS: [&str; 9] =
    ["mp4", "mkv", "avi", "mov", "webm", "m4v", "wmv", "flv", "ts"];
const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff"];

const BYTES_PER_MB: f64 = 1_048_576.0;
const PROGRESS_EMIT_INTERVAL_MS: u64 = 100;

/// Classify a file extension, lower-cased by the caller or not.
pub fn media_type_for(extension: &str) -> Option<MediaType> {
    let ext = extension.to_ascii_lowercase();
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Video)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Image)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct ScanStats {
    pub records: u64,
    pub total_size_mb: f64,
    pub duration_ms: u128,
}

/// Aggregate for one top-level entry under the scan root, shown while the
/// scan is still running.
#[derive(Debug, Clone)]
pub struct ScanPreviewEntry {
    pub name: String,
    pub records: u64,
    pub size_mb: f64,
}

#[derive(Debug, Clone)]
pub struct ScanProgress {
    pub discovered: u64,
    pub records: u64,
    pub preview: Vec<ScanPreviewEntry>,
}

pub type ProgressReporter = Arc<dyn Fn(ScanProgress) + Send + Sync>;

fn should_emit(last_emit_ms: &AtomicU64, elapsed_ms: u64) -> bool {
    let previous = last_emit_ms.load(Ordering::Relaxed);
    if elapsed_ms.saturating_sub(previous) < PROGRESS_EMIT_INTERVAL_MS {
        return false;
    }
    last_emit_ms
        .compare_exchange(previous, elapsed_ms, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
}

fn top_level_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let first = rel.components().next()?;
    Some(first.as_os_str().to_string_lossy().to_string())
}

fn preview_snapshot(preview: &DashMap<String, ScanPreviewEntry>) -> Vec<ScanPreviewEntry> {
    let mut entries: Vec<ScanPreviewEntry> =
        preview.iter().map(|entry| entry.value().clone()).collect();
    entries.sort_by(|a, b| {
        b.size_mb
            .partial_cmp(&a.size_mb)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries
}

fn mtime_epoch_secs(metadata: &std::fs::Metadata) -> f64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_secs_f64())
        .unwrap_or(0.0)
}

/// Walk `root` and build records for every recognized media file.
pub fn scan_directory(
    root: &Path,
    reporter: Option<ProgressReporter>,
) -> Result<(Vec<MediaRecord>, ScanStats), ScanError> {
    if !root.exists() {
        return Err(ScanError::MissingRoot(root.display().to_string()));
    }

    let start = Instant::now();

    // Discovery pass: collect candidate media paths.
    let mut candidates = Vec::new();
    let mut discovered = 0u64;
    let mut discovery_last_emit = Instant::now();
    for entry in WalkDir::new(root).skip_hidden(false) {
        let Ok(entry) = entry else { continue };
        discovered = discovered.saturating_add(1);
        if entry.file_type.is_dir() {
            continue;
        }
        let path = entry.path();
        let recognized = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(media_type_for);
        if let Some(media_type) = recognized {
            candidates.push((path, media_type));
        }
        if let Some(cb) = reporter.as_ref() {
            if discovery_last_emit.elapsed().as_millis() as u64 >= PROGRESS_EMIT_INTERVAL_MS {
                discovery_last_emit = Instant::now();
                cb(ScanProgress {
                    discovered,
                    records: 0,
                    preview: Vec::new(),
                });
            }
        }
    }

    // Metadata pass, in parallel.
    let preview: DashMap<String, ScanPreviewEntry> = DashMap::new();
    let processed = AtomicU64::new(0);
    let last_emit_ms = AtomicU64::new(0);
    let processing_started = Instant::now();

    let mut records: Vec<MediaRecord> = candidates
        .par_iter()
        .filter_map(|(path, media_type)| {
            let metadata = std::fs::metadata(path).ok()?;
            let size_mb = metadata.len() as f64 / BYTES_PER_MB;

            let mut record = MediaRecord::new(path.to_string_lossy().to_string(), *media_type);
            record.size_mb = size_mb;
            record.mtime = mtime_epoch_secs(&metadata);

            if let Some(name) = top_level_name(root, path) {
                let mut entry = preview.entry(name.clone()).or_insert_with(|| {
                    ScanPreviewEntry { name, records: 0, size_mb: 0.0 }
                });
                entry.records += 1;
                entry.size_mb += size_mb;
            }

            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = reporter.as_ref() {
                let elapsed_ms = processing_started.elapsed().as_millis() as u64;
                if done == candidates.len() as u64 || should_emit(&last_emit_ms, elapsed_ms) {
                    cb(ScanProgress {
                        discovered,
                        records: done,
                        preview: preview_snapshot(&preview),
                    });
                }
            }

            Some(record)
        })
        .collect();

    // Deterministic library order regardless of worker interleaving.
    records.sort_by(|a, b| a.path.cmp(&b.path));

    let stats = ScanStats {
        records: records.len() as u64,
        total_size_mb: records.iter().map(|r| r.size_mb).sum(),
        duration_ms: start.elapsed().as_millis(),
    };
    info!(
        records = stats.records,
        duration_ms = stats.duration_ms as u64,
        "directory scan finished"
    );

    Ok((records, stats))
}

/// Epoch seconds for "now", as the pipeline's date filters expect.
pub fn now_epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs_f64())
        .unwrap_or(0.0)
}
