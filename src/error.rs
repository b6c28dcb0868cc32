// Takeout Restore error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Sidecar error: {0}")]
    Sidecar(String),

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("ExifTool error: {0}")]
    ExifTool(String),

    #[error("Copy verification failed: {0}")]
    CopyVerify(String),

    // The classifier asked for an edited/duplicate decision on a stem that no
    // record matches. Always a logic defect upstream, never recoverable.
    #[error("no metadata record matches stem '{0}'")]
    ResolverConsistency(String),

    #[error("{0} media files have no matching metadata record")]
    UnmatchedMedia(usize),

    #[error("{0} metadata records matched no media file")]
    UnmatchedMetadata(usize),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RestoreError>;
