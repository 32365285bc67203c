use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Generic I/O error (creating directories, copying, reading).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored file could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// The file to import does not exist or is not a regular file.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Attachment too large: {size} bytes (max {max})")]
    AttachmentTooLarge { size: u64, max: u64 },

    /// A path handed to the store does not point into managed storage.
    #[error("Path is outside the attachment directory: {}", .0.display())]
    OutsideAttachmentDir(PathBuf),

    /// The final rename of an atomic write failed.
    #[error("Failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
