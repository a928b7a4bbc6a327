mod error;
mod name;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use name::{BlobName, sanitized_extension};
pub use traits::{BlobStore, BoxReader};
