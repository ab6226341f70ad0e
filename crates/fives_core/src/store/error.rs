use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted data: {0}")]
    Corrupted(String),

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Remote sync failed: {0}")]
    Remote(String),
}

impl StoreError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::Io(_) => true,
            StoreError::FileNotFound { .. } => true,
            StoreError::Remote(_) => true,
            StoreError::Corrupted(_) => false,
            StoreError::ChecksumMismatch => false,
            StoreError::VersionMismatch { .. } => false,
            _ => false,
        }
    }
}
