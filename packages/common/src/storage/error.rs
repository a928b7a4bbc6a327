/// Errors that can occur during blob storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(String),
    /// An I/O error on the storage side.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The source stream failed mid-write (client went away, malformed body).
    #[error("upload stream interrupted: {0}")]
    Interrupted(std::io::Error),
    /// The provided blob name is not a flat, safe filename.
    #[error("invalid blob name: {0}")]
    InvalidName(String),
    /// The blob exceeds the configured size limit.
    #[error("blob exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
