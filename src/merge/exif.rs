// EXIF date/GPS merge for still images
//
// Tags are written by the external exiftool binary into a verified copy of
// the source; image container bytes are never parsed in-process.

use std::path::Path;
use std::process::Command;

use chrono::{Local, TimeZone};

use crate::constants::{
    EXIF_DATE_FORMAT, EXIF_IMAGE_EXTENSIONS, GPS_ALTITUDE_DIGITS, GPS_POSITION_DIGITS,
};
use crate::error::{RestoreError, Result};
use crate::tools;
use super::copy::copy_with_verify;
use super::{MediaHandler, MergeFields, MergeOptions};

pub struct ExifHandler;

impl MediaHandler for ExifHandler {
    fn name(&self) -> &'static str {
        "exif"
    }

    fn supports(&self, ext: &str) -> bool {
        EXIF_IMAGE_EXTENSIONS.contains(&ext)
    }

    fn merge(
        &self,
        source: &Path,
        target: &Path,
        fields: &MergeFields,
        options: &MergeOptions,
    ) -> Result<()> {
        copy_with_verify(source, target)?;

        // Existing GPS tags win unless the caller asked to overwrite
        let write_geo = fields.has_geolocation()
            && (options.overwrite_geo || !has_existing_gps(target)?);

        let args = build_exiftool_args(fields, write_geo)?;
        run_exiftool(target, &args)
    }
}

/// Check whether the file already carries GPS position tags.
fn has_existing_gps(path: &Path) -> Result<bool> {
    let output = Command::new(tools::exiftool_path())
        .args(["-j", "-n", "-GPSLatitude", "-GPSLongitude"])
        .arg(path)
        .output()
        .map_err(|e| RestoreError::ExifTool(format!("failed to run exiftool: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(RestoreError::ExifTool(format!(
            "exiftool failed on {}: {}",
            path.display(),
            stderr
        )));
    }

    // exiftool returns an array; take the first element
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| RestoreError::ExifTool(format!("failed to parse exiftool JSON: {e}")))?;
    let first = parsed.as_array().and_then(|a| a.first());

    Ok(first.is_some_and(|obj| {
        obj.get("GPSLatitude").is_some() || obj.get("GPSLongitude").is_some()
    }))
}

/// Build exiftool tag assignments for the capture date and, optionally, the
/// GPS block. Dates are written in the camera's convention: local naive time.
fn build_exiftool_args(fields: &MergeFields, write_geo: bool) -> Result<Vec<String>> {
    let date = Local
        .timestamp_opt(fields.timestamp, 0)
        .single()
        .ok_or_else(|| {
            RestoreError::Sidecar(format!("timestamp {} out of range", fields.timestamp))
        })?;
    let stamp = date.format(EXIF_DATE_FORMAT).to_string();

    let mut args = vec![
        format!("-ModifyDate={stamp}"),
        format!("-DateTimeOriginal={stamp}"),
        format!("-CreateDate={stamp}"),
    ];

    if write_geo {
        let lat_ref = if fields.latitude > 0.0 { "N" } else { "S" };
        let lon_ref = if fields.longitude > 0.0 { "E" } else { "W" };
        // 0 = above sea level, 1 = below
        let alt_ref = i32::from(fields.altitude < 0.0);

        args.push("-GPSVersionID=2 0 0 0".to_string());
        args.push(format!(
            "-GPSLatitude={:.*}",
            GPS_POSITION_DIGITS,
            fields.latitude.abs()
        ));
        args.push(format!("-GPSLatitudeRef={lat_ref}"));
        args.push(format!(
            "-GPSLongitude={:.*}",
            GPS_POSITION_DIGITS,
            fields.longitude.abs()
        ));
        args.push(format!("-GPSLongitudeRef={lon_ref}"));
        args.push(format!(
            "-GPSAltitude={:.*}",
            GPS_ALTITUDE_DIGITS,
            fields.altitude.abs()
        ));
        args.push(format!("-GPSAltitudeRef#={alt_ref}"));
    }

    Ok(args)
}

/// Apply tag assignments to the target in place.
fn run_exiftool(target: &Path, args: &[String]) -> Result<()> {
    let output = Command::new(tools::exiftool_path())
        .args(args)
        .arg("-overwrite_original")
        .arg(target)
        .output()
        .map_err(|e| RestoreError::ExifTool(format!("failed to run exiftool: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(RestoreError::ExifTool(format!(
            "exiftool failed on {}: {}",
            target.display(),
            stderr
        )));
    }

    Ok(())
}

/// Check if exiftool is available
pub fn is_available() -> bool {
    tools::is_tool_available("exiftool")
}
