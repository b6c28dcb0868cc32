// Candidate scoring for the pairing engine

use crate::constants::STEM_MATCH_MIN_RATIO;
use crate::sidecar::MetadataRecord;
use super::classify::MediaDescriptor;

/// Prefix match with a coverage floor: the media stem must be a prefix of
/// the record stem (tolerates on-disk truncation) and cover enough of it to
/// rule out accidental short-prefix collisions.
pub fn stem_matches(partial: &str, full: &str) -> bool {
    stem_similarity(partial, full) >= STEM_MATCH_MIN_RATIO
}

/// Share of `full` covered by the prefix `partial`; 0.0 when not a prefix.
pub fn stem_similarity(partial: &str, full: &str) -> f64 {
    if full.is_empty() || !full.starts_with(partial) {
        return 0.0;
    }
    partial.chars().count() as f64 / full.chars().count() as f64
}

/// Winning candidate for one media descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    pub record_index: usize,
    pub similarity: f64,
    /// Another candidate scored equally and lost only on record order.
    pub tied: bool,
}

/// Pick the candidate whose stem the media stem covers best; the less of the
/// record stem left unaccounted for, the better. Equal scores fall back to
/// record order, which is stable but carries no meaning; the `tied` flag
/// surfaces that the order decided.
pub fn select_best_candidate(
    descriptor: &MediaDescriptor,
    records: &[MetadataRecord],
    candidates: &[usize],
) -> Option<Selection> {
    let mut best: Option<Selection> = None;

    for &record_index in candidates {
        let similarity = stem_similarity(
            &descriptor.target_stem,
            &records[record_index].target_stem,
        );
        match &mut best {
            None => {
                best = Some(Selection {
                    record_index,
                    similarity,
                    tied: false,
                });
            }
            Some(current) => {
                if similarity > current.similarity {
                    *current = Selection {
                        record_index,
                        similarity,
                        tied: false,
                    };
                } else if (similarity - current.similarity).abs() < f64::EPSILON {
                    current.tied = true;
                }
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::classify::MediaVersion;
    use std::path::PathBuf;

    fn descriptor(stem: &str) -> MediaDescriptor {
        MediaDescriptor {
            path: PathBuf::from(format!("{stem}.jpg")),
            target_stem: stem.to_string(),
            target_ext: "jpg".to_string(),
            version: MediaVersion::Original,
            duplicate_ordinal: None,
        }
    }

    fn record(stem: &str) -> MetadataRecord {
        MetadataRecord {
            path: PathBuf::from(format!("{stem}.json")),
            title: format!("{stem}.jpg"),
            target_stem: stem.to_string(),
            target_ext: "jpg".to_string(),
            duplicate_ordinal: None,
            taken_time: None,
            geo_data: None,
        }
    }

    #[test]
    fn test_stem_similarity() {
        assert_eq!(stem_similarity("photo", "photo"), 1.0);
        assert_eq!(stem_similarity("ab", "abcd"), 0.5);
        assert_eq!(stem_similarity("xyz", "abcd"), 0.0);
        assert_eq!(stem_similarity("photo", ""), 0.0);
    }

    #[test]
    fn test_truncated_stem_matches() {
        // 8 of 19 chars covered, just over the floor
        assert!(stem_matches("IMG_2024", "IMG_2024_full_title"));
    }

    #[test]
    fn test_short_prefix_collision_rejected() {
        assert!(!stem_matches("IMG", "IMG_some_long_unrelated_name"));
    }

    #[test]
    fn test_non_prefix_rejected() {
        assert!(!stem_matches("IMG_2025", "IMG_2024_full_title"));
    }

    #[test]
    fn test_selects_highest_similarity() {
        // Media stem of 9 chars against record stems of 18, 10 and 30 chars:
        // similarities 0.5, 0.9 and 0.3
        let d = descriptor("ABCDEFGHI");
        let records = vec![
            record(&format!("ABCDEFGHI{}", "x".repeat(9))),
            record(&format!("ABCDEFGHI{}", "x".repeat(1))),
            record(&format!("ABCDEFGHI{}", "x".repeat(21))),
        ];
        let candidates = [0, 1, 2];

        let selection = select_best_candidate(&d, &records, &candidates).unwrap();
        assert_eq!(selection.record_index, 1);
        assert!((selection.similarity - 0.9).abs() < 1e-9);
        assert!(!selection.tied);
    }

    #[test]
    fn test_equal_scores_keep_first_and_report_tie() {
        let d = descriptor("photo");
        let records = vec![record("photo_aa"), record("photo_bb")];
        let candidates = [0, 1];

        let selection = select_best_candidate(&d, &records, &candidates).unwrap();
        assert_eq!(selection.record_index, 0);
        assert!(selection.tied);
    }

    #[test]
    fn test_tie_flag_resets_on_new_best() {
        let d = descriptor("photo");
        let records = vec![record("photo_aaaa"), record("photo_bbbb"), record("photo_c")];
        let candidates = [0, 1, 2];

        let selection = select_best_candidate(&d, &records, &candidates).unwrap();
        assert_eq!(selection.record_index, 2);
        assert!(!selection.tied);
    }

    #[test]
    fn test_no_candidates() {
        let d = descriptor("photo");
        assert!(select_best_candidate(&d, &[], &[]).is_none());
    }
}
