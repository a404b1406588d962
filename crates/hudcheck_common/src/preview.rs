//! Image preview store
//!
//! Successful image probes keep their downloaded bytes so a renderer can show
//! (or save) them. Each `PreviewHandle` is registered in the store it came
//! from and unregisters itself in `Drop`, which is the only release point.
//! Outcomes share handles through `Arc`, so a preview lives exactly as long
//! as some published or caller-held outcome set still references it.

use bytes::Bytes;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// Registry of live previews
#[derive(Debug, Clone, Default)]
pub struct PreviewStore {
    live: Arc<Mutex<HashMap<Uuid, usize>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of downloaded bytes and register them as a preview
    pub fn acquire(&self, content_type: impl Into<String>, bytes: Bytes) -> PreviewHandle {
        let id = Uuid::new_v4();
        if let Ok(mut live) = self.live.lock() {
            live.insert(id, bytes.len());
        }
        debug!("Acquired preview {} ({} bytes)", id, bytes.len());

        PreviewHandle {
            id,
            content_type: content_type.into(),
            bytes,
            store: Arc::clone(&self.live),
        }
    }

    /// Number of previews not yet released
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    /// Total bytes held by live previews
    pub fn live_bytes(&self) -> usize {
        self.live
            .lock()
            .map(|live| live.values().sum())
            .unwrap_or(0)
    }
}

/// Owned preview resource for one successful image probe
pub struct PreviewHandle {
    id: Uuid,
    content_type: String,
    bytes: Bytes,
    store: Arc<Mutex<HashMap<Uuid, usize>>>,
}

impl PreviewHandle {
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension guessed from the content type
    fn extension(&self) -> &'static str {
        match self.content_type.split(';').next().map(str::trim) {
            Some("image/png") => "png",
            Some("image/jpeg") => "jpg",
            Some("image/gif") => "gif",
            Some("image/webp") => "webp",
            _ => "bin",
        }
    }

    /// Write the preview into `dir` as `<stem>.<ext>` and return the path
    pub fn save_to(&self, dir: &Path, stem: &str) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.{}", stem, self.extension()));
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = self.store.lock() {
            live.remove(&self.id);
        }
        debug!("Released preview {}", self.id);
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("id", &self.id)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// Bytes stay out of JSON output; only the descriptor is emitted
impl Serialize for PreviewHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PreviewHandle", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("content_type", &self.content_type)?;
        state.serialize_field("len", &self.bytes.len())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let store = PreviewStore::new();
        let handle = store.acquire("image/png", Bytes::from_static(b"\x89PNG"));
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.live_bytes(), 4);
        assert_eq!(handle.len(), 4);

        drop(handle);
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_shared_handle_released_by_last_owner() {
        let store = PreviewStore::new();
        let handle = Arc::new(store.acquire("image/png", Bytes::from_static(b"abc")));
        let other = Arc::clone(&handle);

        drop(handle);
        assert_eq!(store.live_count(), 1);
        drop(other);
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_save_to_uses_content_type_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreviewStore::new();
        let handle = store.acquire("image/png", Bytes::from_static(b"png-bytes"));

        let path = handle.save_to(dir.path(), "img_1").unwrap();
        assert!(path.ends_with("img_1.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_serialize_omits_bytes() {
        let store = PreviewStore::new();
        let handle = store.acquire("image/png", Bytes::from_static(b"secret-bytes"));
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["content_type"], "image/png");
        assert_eq!(json["len"], 12);
        assert!(json.get("bytes").is_none());
    }
}
