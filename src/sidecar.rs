// Sidecar record loader
//
// The exporter writes one JSON record per media file. The record's "title"
// field preserves the original untruncated filename, which the on-disk media
// name may not. Album and shared-album manifests live in the same directory
// as plain JSON files and are filtered out here.

use std::fs;
use std::path::{Path, PathBuf};
use serde::Deserialize;

use crate::error::{RestoreError, Result};
use crate::pairing::classify::suffix_number;

/// Raw sidecar document as written by the exporter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarDocument {
    pub title: Option<String>,
    /// View-count marker; present only on records that describe actual media.
    pub image_views: Option<String>,
    pub photo_taken_time: Option<TakenTime>,
    pub geo_data: Option<GeoData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakenTime {
    /// Unix seconds, serialized as a decimal string by the exporter.
    pub timestamp: String,
    pub formatted: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeoData {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// One retained metadata record, keyed for matching.
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    pub path: PathBuf,
    pub title: String,
    /// Stem of the declared title; the matching key.
    pub target_stem: String,
    /// Extension of the declared title, lowercase, no dot. Empty if the
    /// title declares none.
    pub target_ext: String,
    /// Parsed from the sidecar's own on-disk filename, never from the title.
    pub duplicate_ordinal: Option<u32>,
    pub taken_time: Option<TakenTime>,
    pub geo_data: Option<GeoData>,
}

/// Parse one sidecar file. Returns `Ok(None)` for records that do not
/// describe media (albums, shared-album manifests).
pub fn load_record(path: &Path) -> Result<Option<MetadataRecord>> {
    let raw = fs::read_to_string(path)?;
    let doc: SidecarDocument = serde_json::from_str(&raw)?;

    // Only records with a view-count marker describe actual media
    let is_media = doc.image_views.as_deref().is_some_and(|v| !v.is_empty());
    if !is_media {
        return Ok(None);
    }

    let title = doc.title.ok_or_else(|| {
        RestoreError::Sidecar(format!("{}: media record without title", path.display()))
    })?;
    let (target_stem, target_ext) = split_title(&title);

    let own_stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let duplicate_ordinal = suffix_number(own_stem);

    Ok(Some(MetadataRecord {
        path: path.to_path_buf(),
        title,
        target_stem,
        target_ext,
        duplicate_ordinal,
        taken_time: doc.photo_taken_time,
        geo_data: doc.geo_data,
    }))
}

/// Load all sidecar files for one directory, dropping non-media records.
pub fn load_records(paths: &[PathBuf]) -> Result<Vec<MetadataRecord>> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for path in paths {
        match load_record(path)? {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                log::debug!("skipping non-media sidecar {}", path.display());
            }
        }
    }

    log::info!(
        "loaded {} metadata records ({} non-media sidecars skipped)",
        records.len(),
        skipped
    );

    Ok(records)
}

/// Strip characters the exporting system refuses to keep in on-disk names.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !crate::constants::TITLE_INCOMPATIBLE_CHARACTERS.contains(*c))
        .collect()
}

/// On-disk names the exporter may have produced for a declared title:
/// the edited variant, the first duplicate, and the title itself.
/// Diagnostic helper for records that end up unmatched.
pub fn possible_disk_names(title: &str) -> Vec<String> {
    let sanitized = sanitize_title(title);
    let path = Path::new(&sanitized);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&sanitized);
    let dot_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    vec![
        format!("{stem}{}{dot_ext}", crate::constants::EDITED_SUFFIX),
        format!("{stem}(1){dot_ext}"),
        sanitized.clone(),
    ]
}

/// Split a declared title into (stem, lowercase extension without dot).
fn split_title(title: &str) -> (String, String) {
    let path = Path::new(title);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(title)
        .to_string();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    (stem, ext)
}
