// Media filename classification
//
// The exporter overloads the "(1)" suffix: it is either a duplicate-name
// counter or a fallback edited marker used when appending "-edited" would
// overflow a filename length limit. `is_edited_version` decides between the
// two by consulting the sidecar records; it reconstructs exporter intent and
// is a heuristic, not a provable inverse, so it stays isolated here.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::constants::{EDITED_SUFFIX, EDITED_SUFFIX_SHORT};
use crate::error::{RestoreError, Result};
use crate::sidecar::MetadataRecord;
use super::events::{DecisionEvent, DecisionSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaVersion {
    Original,
    Edited,
}

/// Structured view of one media filename.
#[derive(Debug, Clone)]
pub struct MediaDescriptor {
    pub path: PathBuf,
    /// Stem with duplicate/edit markers stripped; the matching key.
    pub target_stem: String,
    /// Extension on disk, lowercase, no dot.
    pub target_ext: String,
    pub version: MediaVersion,
    /// Which copy of a duplicated name this is; never set on edited variants.
    pub duplicate_ordinal: Option<u32>,
}

impl MediaDescriptor {
    pub fn is_edited(&self) -> bool {
        self.version == MediaVersion::Edited
    }
}

/// Parse a trailing "(k)" duplicate suffix from a stem.
pub fn suffix_number(stem: &str) -> Option<u32> {
    let re = Regex::new(r"\((\d+)\)$").ok()?;
    let caps = re.captures(stem.trim())?;
    caps.get(1)?.as_str().parse().ok()
}

/// Decide whether a media file named `<stem>(1).<ext>` is an edited variant
/// or a second copy of a duplicated name.
///
/// If any record whose stem starts with `stem` carries duplicate ordinal 1,
/// the exporter itself expected a second original copy to exist, so the
/// media file is a duplicate. Otherwise the "(1)" must be the fallback
/// edited marker.
pub fn is_edited_version(target_stem: &str, records: &[MetadataRecord]) -> Result<bool> {
    let mut has_match = false;
    for record in records {
        if record.target_stem.starts_with(target_stem) {
            has_match = true;
            if record.duplicate_ordinal == Some(1) {
                return Ok(false);
            }
        }
    }
    if !has_match {
        // Only called for stems already known to need a decision
        return Err(RestoreError::ResolverConsistency(target_stem.to_string()));
    }
    Ok(true)
}

/// Classify one media filename into a descriptor. The record set is needed
/// only for the ambiguous "(1)" case. First rule that matches wins.
pub fn classify_media_file(
    path: &Path,
    records: &[MetadataRecord],
    sink: &mut dyn DecisionSink,
) -> Result<MediaDescriptor> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            RestoreError::InvalidPath(format!("no file stem: {}", path.display()))
        })?;
    let target_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let (target_stem, version, duplicate_ordinal) =
        if let Some(base) = stem.strip_suffix(EDITED_SUFFIX) {
            (base.to_string(), MediaVersion::Edited, None)
        } else if let Some(base) = stem.strip_suffix(EDITED_SUFFIX_SHORT) {
            (base.to_string(), MediaVersion::Edited, None)
        } else if let Some(number) = suffix_number(&stem) {
            let marker = format!("({number})");
            let base = stem.strip_suffix(&marker).unwrap_or(&stem).to_string();
            if number == 1 {
                let edited = is_edited_version(&base, records)?;
                sink.record(DecisionEvent::EditedHeuristic {
                    stem: base.clone(),
                    edited,
                });
                if edited {
                    (base, MediaVersion::Edited, None)
                } else {
                    (base, MediaVersion::Original, Some(1))
                }
            } else {
                (base, MediaVersion::Original, Some(number))
            }
        } else {
            (stem, MediaVersion::Original, None)
        };

    let descriptor = MediaDescriptor {
        path: path.to_path_buf(),
        target_stem,
        target_ext,
        version,
        duplicate_ordinal,
    };

    sink.record(DecisionEvent::MediaClassified {
        media: descriptor.path.clone(),
        stem: descriptor.target_stem.clone(),
        version: descriptor.version,
        ordinal: descriptor.duplicate_ordinal,
    });

    Ok(descriptor)
}

/// Classify a whole directory listing in one pass.
pub fn classify_all(
    paths: &[PathBuf],
    records: &[MetadataRecord],
    sink: &mut dyn DecisionSink,
) -> Result<Vec<MediaDescriptor>> {
    paths
        .iter()
        .map(|path| classify_media_file(path, records, sink))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::events::CollectingSink;

    fn record(stem: &str, ordinal: Option<u32>) -> MetadataRecord {
        MetadataRecord {
            path: PathBuf::from(format!("{stem}.json")),
            title: format!("{stem}.jpg"),
            target_stem: stem.to_string(),
            target_ext: "jpg".to_string(),
            duplicate_ordinal: ordinal,
            taken_time: None,
            geo_data: None,
        }
    }

    fn classify(name: &str, records: &[MetadataRecord]) -> MediaDescriptor {
        let mut sink = CollectingSink::default();
        classify_media_file(Path::new(name), records, &mut sink).unwrap()
    }

    #[test]
    fn test_suffix_number() {
        assert_eq!(suffix_number("photo(2)"), Some(2));
        assert_eq!(suffix_number("photo(13)"), Some(13));
        assert_eq!(suffix_number("photo.jpg(1)"), Some(1));
        assert_eq!(suffix_number("photo"), None);
        assert_eq!(suffix_number("photo(2)x"), None);
        assert_eq!(suffix_number("photo()"), None);
        assert_eq!(suffix_number("photo(a)"), None);
    }

    #[test]
    fn test_plain_stem_unchanged() {
        let d = classify("IMG_2024.jpg", &[]);
        assert_eq!(d.target_stem, "IMG_2024");
        assert_eq!(d.target_ext, "jpg");
        assert_eq!(d.version, MediaVersion::Original);
        assert_eq!(d.duplicate_ordinal, None);
    }

    #[test]
    fn test_edited_suffix_stripped() {
        let d = classify("IMG_2024-edited.jpg", &[]);
        assert_eq!(d.target_stem, "IMG_2024");
        assert_eq!(d.version, MediaVersion::Edited);
        assert_eq!(d.duplicate_ordinal, None);
    }

    #[test]
    fn test_abbreviated_edited_suffix() {
        let d = classify("IMG_2024-edi.jpg", &[]);
        assert_eq!(d.target_stem, "IMG_2024");
        assert_eq!(d.version, MediaVersion::Edited);
        assert_eq!(d.duplicate_ordinal, None);
    }

    #[test]
    fn test_high_ordinal_is_duplicate() {
        let d = classify("photo(3).jpg", &[]);
        assert_eq!(d.target_stem, "photo");
        assert_eq!(d.version, MediaVersion::Original);
        assert_eq!(d.duplicate_ordinal, Some(3));
    }

    #[test]
    fn test_ordinal_one_with_duplicate_record_is_copy() {
        // The sidecar set itself contains a "(1)" record, so the exporter
        // expected a second original copy
        let records = vec![record("photo", None), record("photo", Some(1))];
        assert!(!is_edited_version("photo", &records).unwrap());

        let d = classify("photo(1).jpg", &records);
        assert_eq!(d.version, MediaVersion::Original);
        assert_eq!(d.duplicate_ordinal, Some(1));
    }

    #[test]
    fn test_ordinal_one_without_duplicate_record_is_edited() {
        let records = vec![record("photo", None)];
        assert!(is_edited_version("photo", &records).unwrap());

        let d = classify("photo(1).jpg", &records);
        assert_eq!(d.version, MediaVersion::Edited);
        assert_eq!(d.duplicate_ordinal, None);
    }

    #[test]
    fn test_resolver_requires_a_matching_record() {
        let records = vec![record("unrelated", None)];
        assert!(matches!(
            is_edited_version("photo", &records),
            Err(RestoreError::ResolverConsistency(_))
        ));
    }

    #[test]
    fn test_resolver_matches_records_by_prefix() {
        // The record stem is the full title; the media stem may be truncated
        let records = vec![record("photo_with_long_title", Some(1))];
        assert!(!is_edited_version("photo_with", &records).unwrap());
    }

    #[test]
    fn test_edited_never_carries_ordinal() {
        let records = vec![record("photo", None)];
        for name in ["photo-edited.jpg", "photo-edi.jpg", "photo(1).jpg"] {
            let d = classify(name, &records);
            if d.is_edited() {
                assert_eq!(d.duplicate_ordinal, None, "{name}");
            }
        }
    }

    #[test]
    fn test_extension_lowercased() {
        let d = classify("photo.JPG", &[]);
        assert_eq!(d.target_ext, "jpg");
    }
}
