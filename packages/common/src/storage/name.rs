use std::fmt;

use super::error::StorageError;

const COMPRESSED_PREFIX: &str = "c_";
const MAX_NAME_LEN: usize = 255;

/// A flat, server-generated file name inside an event directory.
///
/// Generated names are a UUID (simple form) followed by a short extension,
/// so they never collide and never contain path separators.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlobName(String);

impl BlobName {
    /// Generate a fresh collision-free name ending in `ext` (e.g. `".jpg"`).
    pub fn generate(ext: &str) -> Self {
        Self(format!("{}{}", uuid::Uuid::new_v4().simple(), ext))
    }

    /// Validate an externally supplied name (URL segment, DB column).
    pub fn parse(name: &str) -> Result<Self, StorageError> {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        if name.starts_with('.') || name.contains("..") {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
        if !name.chars().all(allowed) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// Name of the transcoded sibling of this blob.
    pub fn compressed(&self) -> Self {
        Self(format!("{COMPRESSED_PREFIX}{}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension including the leading dot, if any.
    pub fn extension(&self) -> Option<&str> {
        self.0.rfind('.').map(|idx| &self.0[idx..])
    }
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract a safe extension (with dot, lowercased) from a client-supplied
/// filename. Returns `None` for names without an extension or with
/// extensions containing anything but ASCII alphanumerics.
pub fn sanitized_extension(original: &str) -> Option<String> {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let idx = base.rfind('.')?;
    let ext = &base[idx + 1..];
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}
