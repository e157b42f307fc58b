//! Saving and restoring the project document with its assets.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use launchreel_common::unix_millis;
use launchreel_project_model::{
    OverlayTemplate, PersistedComponent, ProjectDocument, TimelineComponent, VideoClip,
    ASSET_PROP_KEYS, DOCUMENT_VERSION,
};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::refs::LocalRefs;
use crate::store::{BlobStore, KeyValueStore};

/// Key of the project document.
pub const PROJECT_KEY: &str = "launchreelProject";

/// Key of the custom template list.
pub const CUSTOM_TEMPLATES_KEY: &str = "customTemplates";

/// Editable state handed to the saver.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSnapshot {
    pub project_duration: f64,
    pub video_clips: Vec<VideoClip>,
    pub timeline_components: Vec<TimelineComponent>,
    /// Local reference to the main media file, if any.
    pub main_media: Option<String>,
}

/// State recovered from storage, with asset props pointing at fresh
/// local references.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredProject {
    pub video_clips: Vec<VideoClip>,
    pub timeline_components: Vec<TimelineComponent>,
    pub main_media: Option<String>,
    /// Save time, milliseconds since the Unix epoch.
    pub saved_at: i64,
}

/// Project persistence over a key-value store, a blob store and a local
/// reference resolver.
pub struct Persistence {
    kv: Arc<dyn KeyValueStore>,
    blobs: Arc<dyn BlobStore>,
    refs: Arc<dyn LocalRefs>,
    /// Local reference → asset id, so unchanged media is stored once.
    asset_cache: Mutex<HashMap<String, String>>,
}

impl Persistence {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        blobs: Arc<dyn BlobStore>,
        refs: Arc<dyn LocalRefs>,
    ) -> Self {
        Self {
            kv,
            blobs,
            refs,
            asset_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Write the project document. Assets that cannot be stored are logged
    /// and left out; only the document write itself can fail.
    pub fn save(&self, snapshot: &ProjectSnapshot) -> StoreResult<ProjectDocument> {
        let main_video_asset_id = snapshot
            .main_media
            .as_deref()
            .and_then(|reference| self.persist_reference(reference));

        let timeline_components = snapshot
            .timeline_components
            .iter()
            .map(|component| PersistedComponent {
                component: component.clone(),
                assets: self.persist_props(component),
            })
            .collect();

        let document = ProjectDocument {
            version: DOCUMENT_VERSION.to_string(),
            project_duration: snapshot.project_duration,
            video_clips: snapshot.video_clips.clone(),
            timeline_components,
            main_video_asset_id,
            timestamp: unix_millis(),
        };

        self.kv.set(PROJECT_KEY, &document.to_json()?)?;
        tracing::info!(
            clips = document.video_clips.len(),
            overlays = document.timeline_components.len(),
            "Project saved"
        );
        Ok(document)
    }

    /// Load the saved project, if any.
    pub fn restore(&self) -> StoreResult<Option<RestoredProject>> {
        let Some(json) = self.kv.get(PROJECT_KEY)? else {
            return Ok(None);
        };
        let document = ProjectDocument::from_json(&json)?;
        for problem in document.validate() {
            tracing::warn!(problem = %problem, "Saved project has issues");
        }

        let main_media = document
            .main_video_asset_id
            .as_deref()
            .and_then(|id| self.restore_asset(id));

        let timeline_components = document
            .timeline_components
            .into_iter()
            .map(|persisted| {
                let mut component = persisted.component;
                for (key, asset_id) in &persisted.assets {
                    if let Some(reference) = self.restore_asset(asset_id) {
                        component.props.insert(key.clone(), Value::String(reference));
                    }
                }
                component
            })
            .collect();

        tracing::info!(saved_at = document.timestamp, "Project restored");
        Ok(Some(RestoredProject {
            video_clips: document.video_clips,
            timeline_components,
            main_media,
            saved_at: document.timestamp,
        }))
    }

    /// Forget the saved project.
    pub fn clear(&self) -> StoreResult<()> {
        self.kv.remove(PROJECT_KEY)
    }

    pub fn save_custom_templates(&self, templates: &[OverlayTemplate]) -> StoreResult<()> {
        let json = serde_json::to_string(templates).map_err(|source| StoreError::Parse {
            key: CUSTOM_TEMPLATES_KEY.to_string(),
            source,
        })?;
        self.kv.set(CUSTOM_TEMPLATES_KEY, &json)
    }

    /// Saved custom templates. An unreadable list is logged and treated as
    /// empty.
    pub fn load_custom_templates(&self) -> Vec<OverlayTemplate> {
        let json = match self.kv.get(CUSTOM_TEMPLATES_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read custom templates");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<OverlayTemplate>>(&json) {
            Ok(templates) => templates.iter().map(OverlayTemplate::normalized).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse custom templates");
                Vec::new()
            }
        }
    }

    fn persist_props(&self, component: &TimelineComponent) -> BTreeMap<String, String> {
        ASSET_PROP_KEYS
            .iter()
            .filter_map(|key| {
                let reference = component.props.get(*key)?.as_str()?;
                let id = self.persist_reference(reference)?;
                Some((key.to_string(), id))
            })
            .collect()
    }

    /// Store the media behind a local reference, reusing an earlier asset id
    /// for the same reference.
    fn persist_reference(&self, reference: &str) -> Option<String> {
        if !self.refs.is_local(reference) {
            return None;
        }
        if let Some(id) = self.cached_asset(reference) {
            return Some(id);
        }
        let stored = self
            .refs
            .read(reference)
            .and_then(|blob| self.blobs.put(&blob));
        match stored {
            Ok(id) => {
                self.cache_asset(reference, &id);
                Some(id)
            }
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "Failed to persist asset");
                None
            }
        }
    }

    fn restore_asset(&self, asset_id: &str) -> Option<String> {
        let restored = self.blobs.get(asset_id).and_then(|blob| {
            let blob = blob.ok_or_else(|| StoreError::AssetNotFound {
                id: asset_id.to_string(),
            })?;
            self.refs.materialize(asset_id, &blob)
        });
        match restored {
            Ok(reference) => {
                self.cache_asset(&reference, asset_id);
                Some(reference)
            }
            Err(e) => {
                tracing::warn!(asset = %asset_id, error = %e, "Failed to restore asset");
                None
            }
        }
    }

    fn cached_asset(&self, reference: &str) -> Option<String> {
        self.asset_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(reference).cloned())
    }

    fn cache_asset(&self, reference: &str, asset_id: &str) {
        if let Ok(mut cache) = self.asset_cache.lock() {
            cache.insert(reference.to_string(), asset_id.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::FileRefs;
    use crate::store::DirStore;
    use launchreel_project_model::{OverlayKind, Props, TemplateLibrary};
    use serde_json::json;
    use std::path::PathBuf;

    fn setup(name: &str) -> (PathBuf, Arc<DirStore>, Persistence) {
        let dir = std::env::temp_dir().join(format!("launchreel_persist_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        let store = Arc::new(DirStore::open(dir.join("store")).unwrap());
        let refs = Arc::new(FileRefs::new(dir.join("cache")));
        let persistence = Persistence::new(store.clone(), store.clone(), refs);
        (dir, store, persistence)
    }

    fn clip() -> VideoClip {
        VideoClip {
            id: "clip-1".to_string(),
            start: 0.0,
            end: 8.0,
            source_start: 0.0,
            source_end: 8.0,
            name: "demo.webm".to_string(),
            row: 0,
            media_duration: Some(8.0),
            events: vec![],
        }
    }

    fn camera(video_src: &str) -> TimelineComponent {
        let mut props = Props::new();
        props.insert("videoSrc".to_string(), json!(video_src));
        props.insert("size".to_string(), json!(200));
        TimelineComponent {
            id: "camera-1".to_string(),
            kind: OverlayKind::CameraOverlay,
            name: "Camera".to_string(),
            start_time: 0.0,
            end_time: 8.0,
            props,
            row: 0,
        }
    }

    #[test]
    fn test_save_and_restore_with_assets() {
        let (dir, _store, persistence) = setup("assets");
        let cam = dir.join("cam.webm");
        let main = dir.join("main.mp4");
        std::fs::write(&cam, b"camera").unwrap();
        std::fs::write(&main, b"main").unwrap();

        let snapshot = ProjectSnapshot {
            project_duration: 8.0,
            video_clips: vec![clip()],
            timeline_components: vec![camera(&FileRefs::reference_for(&cam))],
            main_media: Some(FileRefs::reference_for(&main)),
        };
        let doc = persistence.save(&snapshot).unwrap();
        assert!(doc.main_video_asset_id.is_some());
        assert_eq!(doc.timeline_components[0].assets.len(), 1);

        let restored = persistence.restore().unwrap().unwrap();
        assert_eq!(restored.video_clips, vec![clip()]);
        let src = restored.timeline_components[0].props["videoSrc"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(src.starts_with("file://"));
        assert_ne!(src, FileRefs::reference_for(&cam));
        assert_eq!(restored.timeline_components[0].props["size"], json!(200));
        assert!(restored.main_media.is_some());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_same_reference_is_stored_once() {
        let (dir, store, persistence) = setup("cache");
        let cam = dir.join("cam.webm");
        std::fs::write(&cam, b"camera").unwrap();
        let snapshot = ProjectSnapshot {
            project_duration: 8.0,
            video_clips: vec![clip()],
            timeline_components: vec![camera(&FileRefs::reference_for(&cam))],
            main_media: None,
        };
        let first = persistence.save(&snapshot).unwrap();
        let second = persistence.save(&snapshot).unwrap();
        assert_eq!(
            first.timeline_components[0].assets,
            second.timeline_components[0].assets
        );
        let blobs = std::fs::read_dir(store.root().join("blobs")).unwrap().count();
        assert_eq!(blobs, 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_asset_is_skipped_not_fatal() {
        let (dir, _store, persistence) = setup("missing");
        let snapshot = ProjectSnapshot {
            project_duration: 8.0,
            video_clips: vec![clip()],
            timeline_components: vec![camera("file:///definitely/not/here.webm")],
            main_media: None,
        };
        let doc = persistence.save(&snapshot).unwrap();
        assert!(doc.timeline_components[0].assets.is_empty());

        let restored = persistence.restore().unwrap().unwrap();
        assert_eq!(
            restored.timeline_components[0].props["videoSrc"],
            json!("file:///definitely/not/here.webm")
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_restore_without_saved_project() {
        let (dir, _store, persistence) = setup("empty");
        assert!(persistence.restore().unwrap().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_custom_templates_round_trip() {
        let (dir, store, persistence) = setup("templates");
        let mut library = TemplateLibrary::new();
        library.create_custom(Some("Badge"), None, Some("<b>new</b>"), None);
        persistence.save_custom_templates(library.custom()).unwrap();

        let loaded = persistence.load_custom_templates();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Badge");

        store.set(CUSTOM_TEMPLATES_KEY, "not json").unwrap();
        assert!(persistence.load_custom_templates().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }
}
