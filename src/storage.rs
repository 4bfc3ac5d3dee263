use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::HttpStore;

/// Value of a store key, or `None` if the key is absent.
pub type MaybeBytes = Option<Bytes>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unsupported storage operation: {0}")]
    Unsupported(String),
}

/// Key-value fetch abstraction over the underlying array container.
///
/// Implementations must tolerate concurrent overlapping requests. A missing
/// key is `Ok(None)`, not an error: chunks that are entirely background are
/// simply never written. A location that cannot be reached at all is a
/// [StorageError].
#[async_trait]
pub trait ReadableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<MaybeBytes, StorageError>;
}

/// Whether a location refers to this store format: a path ending in `.zarr`,
/// optionally followed by one nested image name (`archive.zarr/image1` or
/// `archive.zarr.image1`). No other sniffing is performed.
pub fn is_zarr(location: &str) -> bool {
    let Some(idx) = location.rfind(".zarr") else {
        return false;
    };
    let rest = &location[idx + ".zarr".len()..];
    if rest.is_empty() {
        return true;
    }
    let mut chars = rest.chars();
    if !matches!(chars.next(), Some('/' | '.')) {
        return false;
    }
    let name = chars.as_str();
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Store over a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ReadableStore for FilesystemStore {
    async fn get(&self, key: &str) -> Result<MaybeBytes, StorageError> {
        let path = self.root.join(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// Map-backed store for tests and small synthetic images.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, Bytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.items.insert(key.into(), value.into());
    }
}

#[async_trait]
impl ReadableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<MaybeBytes, StorageError> {
        Ok(self.items.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zarr_locations_are_recognized() {
        assert!(is_zarr("image.zarr"));
        assert!(is_zarr("https://example.org/data/image.zarr"));
        assert!(is_zarr("archive.zarr/image1"));
        assert!(is_zarr("archive.zarr.image1"));

        assert!(!is_zarr("image.n5"));
        assert!(!is_zarr("image.zarrx"));
        assert!(!is_zarr("archive.zarr/image1/0"));
        assert!(!is_zarr("archive.zarr/"));
    }

    #[tokio::test]
    async fn memory_store_distinguishes_missing_from_present() {
        let mut store = MemoryStore::new();
        store.insert("a/.zarray", "{}");
        assert!(store.get("a/.zarray").await.unwrap().is_some());
        assert!(store.get("a/0/0").await.unwrap().is_none());
    }
}
