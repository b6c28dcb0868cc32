// Geolocation stamp for video containers
//
// ffmpeg copies the streams untouched and adds an ISO 6709 location string
// to the container metadata.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::constants::VIDEO_EXTENSIONS;
use crate::error::{RestoreError, Result};
use crate::tools;
use super::copy::copy_with_verify;
use super::{MediaHandler, MergeFields, MergeOptions};

pub struct VideoHandler;

impl MediaHandler for VideoHandler {
    fn name(&self) -> &'static str {
        "video"
    }

    fn supports(&self, ext: &str) -> bool {
        VIDEO_EXTENSIONS.contains(&ext)
    }

    fn merge(
        &self,
        source: &Path,
        target: &Path,
        fields: &MergeFields,
        _options: &MergeOptions,
    ) -> Result<()> {
        if !fields.has_geolocation() {
            return copy_with_verify(source, target);
        }
        add_geolocation(source, target, &to_iso6709(fields.latitude, fields.longitude))
    }
}

/// ISO 6709 point string ("+17.64135+160.93165"). Altitude is dropped;
/// players reading the container location tag ignore it anyway.
pub fn to_iso6709(latitude: f64, longitude: f64) -> String {
    format!("{latitude:+08.5}{longitude:+09.5}")
}

/// ffmpeg -i input -map_metadata 0 -metadata location=... -c copy output
fn add_geolocation(source: &Path, target: &Path, location: &str) -> Result<()> {
    // ffmpeg refuses to overwrite without -y; a stale target from an earlier
    // run must not block the merge
    if target.exists() {
        fs::remove_file(target)?;
    }

    let output = Command::new(tools::ffmpeg_path())
        .arg("-i")
        .arg(source)
        .args(["-map_metadata", "0"])
        .args(["-metadata", &format!("location={location}")])
        .args(["-metadata", &format!("location-eng={location}")])
        .args(["-c", "copy"])
        .arg(target)
        .output()
        .map_err(|e| RestoreError::FFmpeg(format!("failed to run ffmpeg: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(RestoreError::FFmpeg(format!(
            "ffmpeg failed on {}: {}",
            source.display(),
            stderr
        )));
    }

    Ok(())
}

/// Check if ffmpeg is available
pub fn is_available() -> bool {
    tools::is_tool_available("ffmpeg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_video_extensions() {
        let handler = VideoHandler;
        assert!(handler.supports("mp4"));
        assert!(handler.supports("mov"));
        assert!(!handler.supports("avi"));
        assert!(!handler.supports("jpg"));
    }

    #[test]
    fn test_iso6709_positive_coordinates() {
        assert_eq!(to_iso6709(17.641347, 160.931648), "+17.64135+160.93165");
    }

    #[test]
    fn test_iso6709_negative_coordinates() {
        assert_eq!(to_iso6709(-5.0, -60.25), "-5.00000-60.25000");
    }

    #[test]
    fn test_iso6709_zero_pads_small_values() {
        assert_eq!(to_iso6709(0.5, 2.35), "+0.50000+02.35000");
    }
}
