use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatwalkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed boot sector: {0}")]
    MalformedBootSector(String),

    #[error("Truncated FAT: expected {expected} bytes, only {available} available")]
    TruncatedFat { expected: u64, available: u64 },

    #[error("Cluster {cluster} is out of range (FAT has {len} entries)")]
    ClusterOutOfRange { cluster: u16, len: usize },

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FatwalkError>;
