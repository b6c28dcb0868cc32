// Verified copy and file time stamping

use std::fs;
use std::io::Read;
use std::path::Path;

use filetime::FileTime;

use crate::constants::{HASH_CHUNK_SIZE, TEMP_FILE_PREFIX};
use crate::error::{RestoreError, Result};
use super::{MediaHandler, MergeFields, MergeOptions};

/// Catch-all handler: formats nothing else knows how to tag still get a
/// verified copy, and the capture time lands on the copy's mtime.
pub struct CopyHandler;

impl MediaHandler for CopyHandler {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn supports(&self, _ext: &str) -> bool {
        true
    }

    fn merge(
        &self,
        source: &Path,
        target: &Path,
        _fields: &MergeFields,
        _options: &MergeOptions,
    ) -> Result<()> {
        copy_with_verify(source, target)
    }
}

/// Streaming blake3 over a whole file.
pub fn hash_file(path: &Path) -> Result<blake3::Hash> {
    let mut file = fs::File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

/// Copy through a temp name, verify the bytes by read-back hash, then
/// rename into place. A half-written or corrupted copy never lands on the
/// final path.
pub fn copy_with_verify(source: &Path, target: &Path) -> Result<()> {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            RestoreError::InvalidPath(format!("no filename: {}", target.display()))
        })?;
    let tmp_path = target.with_file_name(format!("{TEMP_FILE_PREFIX}{file_name}"));

    fs::copy(source, &tmp_path)?;

    let source_hash = hash_file(source)?;
    let copied_hash = hash_file(&tmp_path)?;
    if source_hash != copied_hash {
        let _ = fs::remove_file(&tmp_path);
        return Err(RestoreError::CopyVerify(format!(
            "hash mismatch copying {} to {}",
            source.display(),
            target.display()
        )));
    }

    fs::rename(&tmp_path, target)?;

    Ok(())
}

/// Stamp a Unix capture time as the file's modification time.
pub fn set_file_timestamp(path: &Path, unix_seconds: i64) -> Result<()> {
    let mtime = FileTime::from_unix_time(unix_seconds, 0);
    filetime::set_file_mtime(path, mtime)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_with_verify_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("clip.mp4");
        let target = tmp.path().join("out").join("clip.mp4");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&source, b"payload bytes for the copy test").unwrap();

        copy_with_verify(&source, &target).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"payload bytes for the copy test");
        for entry in fs::read_dir(target.parent().unwrap()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(
                !name.starts_with(TEMP_FILE_PREFIX),
                "temp file left behind: {name}"
            );
        }
    }

    #[test]
    fn test_hash_detects_corruption() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.bin");
        let copy = tmp.path().join("b.bin");
        fs::write(&source, b"identical content").unwrap();
        fs::write(&copy, b"identical content").unwrap();

        assert_eq!(hash_file(&source).unwrap(), hash_file(&copy).unwrap());

        // Flip one byte
        let mut bytes = fs::read(&copy).unwrap();
        bytes[0] ^= 0xFF;
        fs::write(&copy, &bytes).unwrap();

        assert_ne!(hash_file(&source).unwrap(), hash_file(&copy).unwrap());
    }

    #[test]
    fn test_copy_missing_source_fails_without_target() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("does_not_exist.jpg");
        let target = tmp.path().join("copy.jpg");

        assert!(copy_with_verify(&source, &target).is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_set_file_timestamp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stamped.jpg");
        fs::write(&path, b"x").unwrap();

        let capture_time = 1_577_836_800; // 2020-01-01T00:00:00Z
        set_file_timestamp(&path, capture_time).unwrap();

        let meta = fs::metadata(&path).unwrap();
        let mtime = FileTime::from_last_modification_time(&meta);
        assert_eq!(mtime.unix_seconds(), capture_time);
    }
}
