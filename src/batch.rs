// Multi-directory batch processing
//
// Each export directory is self-contained: its classification, resolution
// and pairing share no state with any other directory, so directories fan
// out across a small pool of worker threads. Per-directory failures are
// logged and counted, never propagated across the batch.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::discover;
use crate::error::{RestoreError, Result};
use crate::merge::{self, MergeOptions};
use crate::pairing::{self, events::LogSink, PairingOptions};

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub directories: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub media_matched: usize,
    pub media_unmatched: usize,
}

/// Process every immediate subdirectory of an export root. With merge
/// options set, merged copies land under the target root mirroring the
/// subdirectory names.
pub fn run_batch(
    root: &Path,
    pairing_options: &PairingOptions,
    merge_options: Option<&MergeOptions>,
    workers: usize,
) -> Result<BatchSummary> {
    let dirs = discover::list_subdirectories(root)?;
    let summary = Arc::new(Mutex::new(BatchSummary {
        directories: dirs.len(),
        ..Default::default()
    }));
    let next = Arc::new(Mutex::new(0usize));
    let workers = workers.clamp(1, dirs.len().max(1));

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let dirs = &dirs;
            let next = Arc::clone(&next);
            let summary = Arc::clone(&summary);

            std::thread::Builder::new()
                .name(format!("batch-worker-{worker}"))
                .spawn_scoped(scope, move || loop {
                    let index = {
                        let mut guard = next.lock().unwrap();
                        let index = *guard;
                        *guard += 1;
                        index
                    };
                    let Some(dir) = dirs.get(index) else { break };

                    match process_directory(dir, pairing_options, merge_options) {
                        Ok((matched, unmatched)) => {
                            let mut guard = summary.lock().unwrap();
                            guard.succeeded += 1;
                            guard.media_matched += matched;
                            guard.media_unmatched += unmatched;
                        }
                        Err(e) => {
                            log::error!("failed to process {}: {}", dir.display(), e);
                            summary.lock().unwrap().failed += 1;
                        }
                    }
                })
                .expect("failed to spawn batch worker thread");
        }
    });

    let summary = summary.lock().unwrap().clone();
    log::info!(
        "batch complete: {} of {} directories succeeded",
        summary.succeeded,
        summary.directories
    );

    Ok(summary)
}

/// Pair (and optionally merge) one directory. Returns (matched, unmatched)
/// media counts.
fn process_directory(
    dir: &Path,
    pairing_options: &PairingOptions,
    merge_options: Option<&MergeOptions>,
) -> Result<(usize, usize)> {
    let mut sink = LogSink;
    let outcome = pairing::pair_directory(dir, pairing_options, &mut sink)?;
    let matched = outcome.assigned_count();
    let unmatched = outcome.unmatched_media.len();

    if let Some(options) = merge_options {
        let name = dir.file_name().ok_or_else(|| {
            RestoreError::InvalidPath(format!("no directory name: {}", dir.display()))
        })?;
        let options = MergeOptions {
            target_dir: options.target_dir.join(name),
            overwrite_geo: options.overwrite_geo,
        };
        let merge_summary = merge::merge_outcome(&outcome, &options)?;
        if merge_summary.failed > 0 {
            log::warn!(
                "{}: {} files failed to merge",
                dir.display(),
                merge_summary.failed
            );
        }
    }

    Ok((matched, unmatched))
}
