// Takeout Restore constants

// Filename markers used by the exporting system
pub const EDITED_SUFFIX: &str = "-edited";
// Abbreviated edited marker the exporter falls back to near filename length limits
pub const EDITED_SUFFIX_SHORT: &str = "-edi";

// Minimum share of a record stem that a media stem prefix must cover.
// Rejects accidental short-prefix collisions ("IMG" vs "IMG_long_unrelated").
pub const STEM_MATCH_MIN_RATIO: f64 = 0.4;

// Sidecar records
pub const SIDECAR_EXTENSION: &str = "json";

// Format handling
pub const EXIF_IMAGE_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "jpe", "jif", "jfif", "jfi", "webp", "tif", "tiff",
];
pub const VIDEO_EXTENSIONS: [&str; 2] = ["mp4", "mov"];

// EXIF formatting
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
pub const GPS_POSITION_DIGITS: usize = 6;
pub const GPS_ALTITUDE_DIGITS: usize = 2;

// Copy verification
pub const HASH_CHUNK_SIZE: usize = 1_048_576; // 1MB
pub const TEMP_FILE_PREFIX: &str = ".tmp_";

// Batch processing
pub const DEFAULT_BATCH_WORKERS: usize = 4;

// Characters the exporting system strips from declared titles
pub const TITLE_INCOMPATIBLE_CHARACTERS: &str = "%<>=:?\u{bf}*#&{}\\@!+|\"'";
