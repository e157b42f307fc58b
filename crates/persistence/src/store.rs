//! Key-value and blob storage seams, plus a directory-backed implementation.

use std::path::{Path, PathBuf};

use launchreel_project_model::new_id;

use crate::error::{StoreError, StoreResult};

/// Binary payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// Last-write-wins string store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Store for media blobs addressed by generated asset ids.
pub trait BlobStore: Send + Sync {
    /// Store `blob` and return its new asset id.
    fn put(&self, blob: &Blob) -> StoreResult<String>;
    fn get(&self, id: &str) -> StoreResult<Option<Blob>>;
    fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Both stores under one directory:
///
/// ```text
/// <root>/kv/<key>.json
/// <root>/blobs/<id>.bin
/// <root>/blobs/<id>.mime
/// ```
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        for subdir in ["kv", "blobs"] {
            let dir = root.join(subdir);
            std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join("kv").join(format!("{}.json", sanitize(key)))
    }

    fn blob_paths(&self, id: &str) -> (PathBuf, PathBuf) {
        let base = self.root.join("blobs");
        let id = sanitize(id);
        (base.join(format!("{id}.bin")), base.join(format!("{id}.mime")))
    }
}

/// Keep file names to a safe character set.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn read_optional(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

fn remove_optional(path: &Path) -> StoreResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.key_path(key);
        Ok(read_optional(&path)?.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.key_path(key);
        // Readers never observe a partially written document.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| StoreError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        remove_optional(&self.key_path(key))
    }
}

impl BlobStore for DirStore {
    fn put(&self, blob: &Blob) -> StoreResult<String> {
        let id = new_id("asset");
        let (data, mime) = self.blob_paths(&id);
        std::fs::write(&data, &blob.bytes).map_err(|e| StoreError::io(&data, e))?;
        std::fs::write(&mime, &blob.mime).map_err(|e| StoreError::io(&mime, e))?;
        tracing::debug!(asset = %id, bytes = blob.bytes.len(), mime = %blob.mime, "Stored blob");
        Ok(id)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Blob>> {
        let (data, mime) = self.blob_paths(id);
        let Some(bytes) = read_optional(&data)? else {
            return Ok(None);
        };
        let mime = read_optional(&mime)?
            .map(|m| String::from_utf8_lossy(&m).into_owned())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        Ok(Some(Blob { bytes, mime }))
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let (data, mime) = self.blob_paths(id);
        remove_optional(&data)?;
        remove_optional(&mime)
    }
}
