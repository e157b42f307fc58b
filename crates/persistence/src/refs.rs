//! Local media references.
//!
//! Overlay props point at media through short-lived local references (the
//! editor uses `file://` URLs). They do not survive a restart, so on save the
//! bytes move into the blob store and on restore a fresh reference is minted
//! for each blob.

use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::store::Blob;

/// Reads and mints local media references.
pub trait LocalRefs: Send + Sync {
    /// Whether `reference` points at local media that must be persisted.
    fn is_local(&self, reference: &str) -> bool;

    /// Load the media behind `reference`.
    fn read(&self, reference: &str) -> StoreResult<Blob>;

    /// Make `blob` available again and return a reference to it.
    fn materialize(&self, asset_id: &str, blob: &Blob) -> StoreResult<String>;
}

const FILE_SCHEME: &str = "file://";

/// `file://` references backed by a cache directory for restored assets.
#[derive(Debug, Clone)]
pub struct FileRefs {
    cache_dir: PathBuf,
}

impl FileRefs {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// `file://` URL for a path.
    pub fn reference_for(path: &Path) -> String {
        format!("{FILE_SCHEME}{}", path.display())
    }

    /// Filesystem path behind a `file://` reference.
    pub fn path_of(reference: &str) -> Option<PathBuf> {
        reference.strip_prefix(FILE_SCHEME).map(PathBuf::from)
    }
}

impl LocalRefs for FileRefs {
    fn is_local(&self, reference: &str) -> bool {
        reference.starts_with(FILE_SCHEME)
    }

    fn read(&self, reference: &str) -> StoreResult<Blob> {
        let path = Self::path_of(reference).ok_or_else(|| StoreError::NotLocal {
            reference: reference.to_string(),
        })?;
        let bytes = std::fs::read(&path).map_err(|e| StoreError::io(&path, e))?;
        Ok(Blob {
            bytes,
            mime: mime_for_path(&path).to_string(),
        })
    }

    fn materialize(&self, asset_id: &str, blob: &Blob) -> StoreResult<String> {
        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|e| StoreError::io(&self.cache_dir, e))?;
        let path = self
            .cache_dir
            .join(format!("{asset_id}.{}", extension_for_mime(&blob.mime)));
        std::fs::write(&path, &blob.bytes).map_err(|e| StoreError::io(&path, e))?;
        Ok(Self::reference_for(&path))
    }
}

/// MIME type guessed from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "video/x-matroska" => "mkv",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "audio/mpeg" => "mp3",
        "audio/wav" => "wav",
        "audio/ogg" => "ogg",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_guessing() {
        assert_eq!(mime_for_path(Path::new("/tmp/a.WEBM")), "video/webm");
        assert_eq!(mime_for_path(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
        assert_eq!(extension_for_mime("image/png"), "png");
    }

    #[test]
    fn test_read_and_materialize_round_trip() {
        let dir = std::env::temp_dir().join("launchreel_refs_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let source = dir.join("cam.webm");
        std::fs::write(&source, b"webm-bytes").unwrap();

        let refs = FileRefs::new(dir.join("cache"));
        let reference = FileRefs::reference_for(&source);
        assert!(refs.is_local(&reference));
        assert!(!refs.is_local("https://example.com/a.mp4"));

        let blob = refs.read(&reference).unwrap();
        assert_eq!(blob.mime, "video/webm");

        let restored = refs.materialize("asset-1", &blob).unwrap();
        assert!(restored.ends_with("asset-1.webm"));
        assert_eq!(refs.read(&restored).unwrap().bytes, b"webm-bytes");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_rejects_remote_reference() {
        let refs = FileRefs::new(std::env::temp_dir());
        assert!(matches!(
            refs.read("https://example.com/a.mp4"),
            Err(StoreError::NotLocal { .. })
        ));
    }
}
