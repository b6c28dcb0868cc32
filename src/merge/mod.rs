// Metadata merge stage
//
// Consumes (descriptor, record) pairs produced by the pairing engine and
// writes the record's capture timestamp and geolocation into a copy of each
// media file. Format handlers form a statically enumerated table scanned in
// declaration order; the plain-copy handler is the explicit catch-all final
// entry, so dispatch always lands somewhere.

pub mod copy;
pub mod exif;
pub mod video;

use std::path::{Path, PathBuf};

use crate::error::{RestoreError, Result};
use crate::pairing::classify::MediaDescriptor;
use crate::pairing::{Assignment, PairingOutcome};
use crate::sidecar::MetadataRecord;

/// Fields every handler consumes, validated out of a record at write time.
/// Matching never needs them; a record with a broken timestamp still pairs.
#[derive(Debug, Clone, Copy)]
pub struct MergeFields {
    /// Capture time, Unix seconds.
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl MergeFields {
    /// The exporter writes zeroed coordinates when it has no position.
    pub fn has_geolocation(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }
}

/// Extract and validate merge fields from a record.
pub fn merge_fields(record: &MetadataRecord) -> Result<MergeFields> {
    let taken = record.taken_time.as_ref().ok_or_else(|| {
        RestoreError::Sidecar(format!("{}: missing photoTakenTime", record.path.display()))
    })?;
    let timestamp = taken.timestamp.parse::<i64>().map_err(|_| {
        RestoreError::Sidecar(format!(
            "{}: bad timestamp '{}'",
            record.path.display(),
            taken.timestamp
        ))
    })?;
    let geo = record.geo_data.as_ref().ok_or_else(|| {
        RestoreError::Sidecar(format!("{}: missing geoData", record.path.display()))
    })?;

    Ok(MergeFields {
        timestamp,
        latitude: geo.latitude,
        longitude: geo.longitude,
        altitude: geo.altitude,
    })
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Directory merged copies are written into.
    pub target_dir: PathBuf,
    /// Replace GPS tags that already exist in the media file. Off by
    /// default: embedded positions are usually more precise than the
    /// exporter's.
    pub overwrite_geo: bool,
}

/// Capability interface for one media format family.
pub trait MediaHandler: Sync {
    fn name(&self) -> &'static str;
    /// Extension is lowercase without a dot.
    fn supports(&self, ext: &str) -> bool;
    fn merge(
        &self,
        source: &Path,
        target: &Path,
        fields: &MergeFields,
        options: &MergeOptions,
    ) -> Result<()>;
}

// Scanned in order; the copy handler accepts every extension.
const HANDLERS: [&dyn MediaHandler; 3] = [
    &exif::ExifHandler,
    &video::VideoHandler,
    &copy::CopyHandler,
];

/// Find the handler for a normalized extension.
pub fn handler_for_extension(ext: &str) -> &'static dyn MediaHandler {
    HANDLERS
        .iter()
        .copied()
        .find(|h| h.supports(ext))
        .unwrap_or(&copy::CopyHandler)
}

#[derive(Debug, Clone, Default)]
pub struct MergeSummary {
    pub merged: usize,
    pub failed: usize,
}

/// Merge every assignment in a pairing outcome. Per-file failures are
/// logged and counted, never propagated; one bad record must not stop the
/// rest of the directory.
pub fn merge_outcome(outcome: &PairingOutcome, options: &MergeOptions) -> Result<MergeSummary> {
    std::fs::create_dir_all(&options.target_dir)?;

    let mut summary = MergeSummary::default();
    for assignment in &outcome.assignments {
        merge_assignment(assignment, options, &mut summary);
    }

    log::info!(
        "merged {} files into {} ({} failed)",
        summary.merged,
        options.target_dir.display(),
        summary.failed
    );

    Ok(summary)
}

/// Merge every media file in one record's bucket.
pub fn merge_assignment(
    assignment: &Assignment,
    options: &MergeOptions,
    summary: &mut MergeSummary,
) {
    for descriptor in &assignment.media {
        match merge_single(descriptor, &assignment.record, options) {
            Ok(target) => {
                summary.merged += 1;
                log::debug!(
                    "merged {} -> {}",
                    descriptor.path.display(),
                    target.display()
                );
            }
            Err(e) => {
                summary.failed += 1;
                log::error!("failed to merge {}: {}", descriptor.path.display(), e);
            }
        }
    }
}

/// Merge one (descriptor, record) pair: dispatch to the format handler,
/// then stamp the capture time as the copy's modification time.
pub fn merge_single(
    descriptor: &MediaDescriptor,
    record: &MetadataRecord,
    options: &MergeOptions,
) -> Result<PathBuf> {
    let fields = merge_fields(record)?;

    let file_name = descriptor.path.file_name().ok_or_else(|| {
        RestoreError::InvalidPath(format!("no filename: {}", descriptor.path.display()))
    })?;
    let target = options.target_dir.join(file_name);

    let handler = handler_for_extension(&descriptor.target_ext);
    log::debug!(
        "{} handled by {}",
        descriptor.path.display(),
        handler.name()
    );
    handler.merge(&descriptor.path, &target, &fields, options)?;

    copy::set_file_timestamp(&target, fields.timestamp)?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sidecar::{GeoData, TakenTime};
    use std::path::PathBuf;

    fn record_with(taken: Option<TakenTime>, geo: Option<GeoData>) -> MetadataRecord {
        MetadataRecord {
            path: PathBuf::from("photo.json"),
            title: "photo.jpg".to_string(),
            target_stem: "photo".to_string(),
            target_ext: "jpg".to_string(),
            duplicate_ordinal: None,
            taken_time: taken,
            geo_data: geo,
        }
    }

    #[test]
    fn test_dispatch_by_extension() {
        assert_eq!(handler_for_extension("jpg").name(), "exif");
        assert_eq!(handler_for_extension("webp").name(), "exif");
        assert_eq!(handler_for_extension("tiff").name(), "exif");
        assert_eq!(handler_for_extension("mp4").name(), "video");
        assert_eq!(handler_for_extension("mov").name(), "video");
        // Everything else falls through to the catch-all
        assert_eq!(handler_for_extension("gif").name(), "copy");
        assert_eq!(handler_for_extension("png").name(), "copy");
        assert_eq!(handler_for_extension("").name(), "copy");
    }

    #[test]
    fn test_merge_fields_complete_record() {
        let record = record_with(
            Some(TakenTime {
                timestamp: "1577836800".to_string(),
                formatted: None,
            }),
            Some(GeoData {
                latitude: 1.5,
                longitude: -2.5,
                altitude: 10.0,
            }),
        );

        let fields = merge_fields(&record).unwrap();
        assert_eq!(fields.timestamp, 1_577_836_800);
        assert!(fields.has_geolocation());
    }

    #[test]
    fn test_merge_fields_missing_timestamp() {
        let record = record_with(None, Some(GeoData::default()));
        assert!(matches!(
            merge_fields(&record),
            Err(RestoreError::Sidecar(_))
        ));
    }

    #[test]
    fn test_merge_fields_bad_timestamp_string() {
        let record = record_with(
            Some(TakenTime {
                timestamp: "not-a-number".to_string(),
                formatted: None,
            }),
            Some(GeoData::default()),
        );
        assert!(matches!(
            merge_fields(&record),
            Err(RestoreError::Sidecar(_))
        ));
    }

    #[test]
    fn test_merge_fields_missing_geo() {
        let record = record_with(
            Some(TakenTime {
                timestamp: "0".to_string(),
                formatted: None,
            }),
            None,
        );
        assert!(matches!(
            merge_fields(&record),
            Err(RestoreError::Sidecar(_))
        ));
    }

    #[test]
    fn test_zeroed_coordinates_mean_no_position() {
        let fields = MergeFields {
            timestamp: 0,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
        };
        assert!(!fields.has_geolocation());

        let fields = MergeFields {
            latitude: 0.0,
            longitude: 12.0,
            ..fields
        };
        assert!(!fields.has_geolocation());
    }
}
