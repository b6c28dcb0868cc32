// Pairing engine -- matches media files to their sidecar metadata records
//
// Pure computation over one directory's in-memory structures. Directories
// are independent; callers may fan them out across threads freely.

pub mod classify;
pub mod engine;
pub mod events;


use std::path::Path;

use crate::discover;
use crate::error::{RestoreError, Result};
use crate::sidecar::{self, MetadataRecord};
use self::classify::MediaDescriptor;
use self::events::{DecisionEvent, DecisionSink, RejectReason};

#[derive(Debug, Clone, Copy, Default)]
pub struct PairingOptions {
    /// Require the media extension to equal a non-empty record extension.
    pub require_ext: bool,
    /// Return unmatched lists instead of failing the directory on them.
    pub lenient: bool,
}

/// One record and the media descriptors assigned to it: an original and,
/// possibly, its edited sibling.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub record: MetadataRecord,
    pub media: Vec<MediaDescriptor>,
}

/// Result of pairing one directory.
#[derive(Debug, Clone, Default)]
pub struct PairingOutcome {
    /// Every retained record with its bucket, in record order.
    pub assignments: Vec<Assignment>,
    pub unmatched_media: Vec<MediaDescriptor>,
    /// Records whose buckets ended empty.
    pub unmatched_records: Vec<MetadataRecord>,
}

impl PairingOutcome {
    /// Total media descriptors assigned across all buckets.
    pub fn assigned_count(&self) -> usize {
        self.assignments.iter().map(|a| a.media.len()).sum()
    }
}

/// Pair one export directory end to end: list, load, classify, match.
pub fn pair_directory(
    dir: &Path,
    options: &PairingOptions,
    sink: &mut dyn DecisionSink,
) -> Result<PairingOutcome> {
    let listing = discover::list_folder(dir)?;
    let records = sidecar::load_records(&listing.sidecars)?;
    let media = classify::classify_all(&listing.media, &records, sink)?;
    pair_media(media, records, options, sink)
}

/// Match classified descriptors against loaded records.
pub fn pair_media(
    media: Vec<MediaDescriptor>,
    records: Vec<MetadataRecord>,
    options: &PairingOptions,
    sink: &mut dyn DecisionSink,
) -> Result<PairingOutcome> {
    let total_media = media.len();
    let mut buckets: Vec<Vec<MediaDescriptor>> = records.iter().map(|_| Vec::new()).collect();
    let mut unmatched_media: Vec<MediaDescriptor> = Vec::new();

    for descriptor in media {
        let mut candidates: Vec<usize> = Vec::new();

        for (index, record) in records.iter().enumerate() {
            if !engine::stem_matches(&descriptor.target_stem, &record.target_stem) {
                continue;
            }
            if options.require_ext
                && !record.target_ext.is_empty()
                && descriptor.target_ext != record.target_ext
            {
                sink.record(DecisionEvent::CandidateRejected {
                    media: descriptor.path.clone(),
                    record: record.path.clone(),
                    reason: RejectReason::ExtensionMismatch,
                });
                continue;
            }
            if record.duplicate_ordinal != descriptor.duplicate_ordinal {
                sink.record(DecisionEvent::CandidateRejected {
                    media: descriptor.path.clone(),
                    record: record.path.clone(),
                    reason: RejectReason::OrdinalMismatch,
                });
                continue;
            }
            sink.record(DecisionEvent::CandidateAccepted {
                media: descriptor.path.clone(),
                record: record.path.clone(),
                similarity: engine::stem_similarity(
                    &descriptor.target_stem,
                    &record.target_stem,
                ),
            });
            candidates.push(index);
        }

        let Some(selection) = engine::select_best_candidate(&descriptor, &records, &candidates)
        else {
            sink.record(DecisionEvent::MediaUnmatched {
                media: descriptor.path.clone(),
            });
            unmatched_media.push(descriptor);
            continue;
        };

        sink.record(DecisionEvent::Assigned {
            media: descriptor.path.clone(),
            record: records[selection.record_index].path.clone(),
            similarity: selection.similarity,
            tied: selection.tied,
        });
        buckets[selection.record_index].push(descriptor);
    }

    let assigned_total: usize = buckets.iter().map(Vec::len).sum();
    let mut unmatched_records: Vec<MetadataRecord> = Vec::new();
    for (record, bucket) in records.iter().zip(&buckets) {
        if bucket.is_empty() {
            sink.record(DecisionEvent::RecordUnmatched {
                record: record.path.clone(),
            });
            log::debug!(
                "expected on-disk names for '{}': {}",
                record.title,
                sidecar::possible_disk_names(&record.title).join(", ")
            );
            unmatched_records.push(record.clone());
        }
    }

    log::info!(
        "matched {} of {} media files across {} records",
        assigned_total,
        total_media,
        records.len()
    );

    // Fail closed: every media file accounted for, every bucket non-empty
    if !options.lenient {
        if assigned_total != total_media {
            return Err(RestoreError::UnmatchedMedia(total_media - assigned_total));
        }
        if !unmatched_records.is_empty() {
            return Err(RestoreError::UnmatchedMetadata(unmatched_records.len()));
        }
    }

    let assignments = records
        .into_iter()
        .zip(buckets)
        .map(|(record, media)| Assignment { record, media })
        .collect();

    Ok(PairingOutcome {
        assignments,
        unmatched_media,
        unmatched_records,
    })
}
