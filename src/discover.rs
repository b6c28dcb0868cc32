// File discovery for one export directory

use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use crate::constants::SIDECAR_EXTENSION;
use crate::error::{RestoreError, Result};

/// Everything found in one export directory, split by role.
#[derive(Debug, Clone, Default)]
pub struct FolderListing {
    pub media: Vec<PathBuf>,
    pub sidecars: Vec<PathBuf>,
}

/// List a single export directory (non-recursive) and split media files
/// from sidecar records. Anything that is not a sidecar counts as media;
/// the exporter dumps both into the same flat directory.
pub fn list_folder(dir: &Path) -> Result<FolderListing> {
    if !dir.is_dir() {
        return Err(RestoreError::InvalidPath(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let mut listing = FolderListing::default();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if is_sidecar_file(path) {
            listing.sidecars.push(path.to_path_buf());
        } else {
            listing.media.push(path.to_path_buf());
        }
    }

    // Sort by path for consistent ordering
    listing.media.sort();
    listing.sidecars.sort();

    log::debug!(
        "{}: {} media files, {} sidecar records",
        dir.display(),
        listing.media.len(),
        listing.sidecars.len()
    );

    Ok(listing)
}

/// Check if a file is a sidecar record
pub fn is_sidecar_file(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_lowercase(),
        None => return false,
    };

    ext == SIDECAR_EXTENSION
}

/// List the immediate subdirectories of an export root (for batch mode)
pub fn list_subdirectories(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(RestoreError::InvalidPath(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}
