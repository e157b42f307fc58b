//! Subcommand implementations and the project directory they share.
//!
//! A project directory holds the key-value and blob stores under `store/`
//! and media restored from blobs under `media/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use launchreel_common::EditorTuning;
use launchreel_editor_core::Timeline;
use launchreel_persistence::project_store::PROJECT_KEY;
use launchreel_persistence::{
    DirStore, FileRefs, KeyValueStore, Persistence, ProjectSnapshot,
};
use launchreel_project_model::{ProjectDocument, TemplateLibrary};

pub mod check;
pub mod edit;
pub mod export;
pub mod info;
pub mod init;
pub mod overlay;
pub mod templates;
pub mod validate;

/// Storage for one project directory.
pub struct ProjectDir {
    root: PathBuf,
    store: Arc<DirStore>,
    persistence: Persistence,
}

/// A restored, editable project.
pub struct OpenProject {
    pub timeline: Timeline,
    /// `file://` reference to the main media.
    pub main_media: Option<String>,
    pub saved_at: i64,
}

impl OpenProject {
    /// Filesystem path of the main media.
    pub fn media_path(&self) -> Option<PathBuf> {
        self.main_media.as_deref().and_then(FileRefs::path_of)
    }
}

impl ProjectDir {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let store = Arc::new(
            DirStore::open(root.join("store"))
                .with_context(|| format!("Failed to open project at {}", root.display()))?,
        );
        let refs = Arc::new(FileRefs::new(root.join("media")));
        let persistence = Persistence::new(store.clone(), store.clone(), refs);
        Ok(Self {
            root: root.to_path_buf(),
            store,
            persistence,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Restore the saved project into a timeline.
    pub fn load(&self, tuning: EditorTuning) -> anyhow::Result<OpenProject> {
        let restored = self
            .persistence
            .restore()?
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No project saved at {}. Run `launchreel init` first.",
                    self.root.display()
                )
            })?;
        let timeline = Timeline::from_parts(
            restored.video_clips,
            restored.timeline_components,
            tuning,
        )?;
        Ok(OpenProject {
            timeline,
            main_media: restored.main_media,
            saved_at: restored.saved_at,
        })
    }

    pub fn save(&self, timeline: &Timeline, main_media: Option<String>) -> anyhow::Result<()> {
        self.persistence.save(&ProjectSnapshot {
            project_duration: timeline.project_duration(),
            video_clips: timeline.clips().to_vec(),
            timeline_components: timeline.overlays().to_vec(),
            main_media,
        })?;
        Ok(())
    }

    /// The saved document as stored, without restoring assets.
    pub fn document(&self) -> anyhow::Result<Option<ProjectDocument>> {
        match KeyValueStore::get(self.store.as_ref(), PROJECT_KEY)? {
            Some(json) => Ok(Some(ProjectDocument::from_json(&json)?)),
            None => Ok(None),
        }
    }

    pub fn store(&self) -> &DirStore {
        &self.store
    }

    pub fn library(&self) -> TemplateLibrary {
        TemplateLibrary::with_custom(self.persistence.load_custom_templates())
    }

    pub fn save_library(&self, library: &TemplateLibrary) -> anyhow::Result<()> {
        self.persistence.save_custom_templates(library.custom())?;
        Ok(())
    }
}

/// Load, edit and save in one step.
pub fn edit_project<T>(
    path: &Path,
    tuning: EditorTuning,
    edit: impl FnOnce(&mut Timeline, &ProjectDir) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let project_dir = ProjectDir::open(path)?;
    let mut project = project_dir.load(tuning)?;
    let result = edit(&mut project.timeline, &project_dir)?;
    project_dir.save(&project.timeline, project.main_media)?;
    Ok(result)
}

/// Print the clip and overlay lanes.
pub fn print_timeline(timeline: &Timeline) {
    println!("Duration: {:.2}s", timeline.project_duration());
    println!("Clips:");
    for clip in timeline.clips() {
        println!(
            "  {} [{:.2}s - {:.2}s] source [{:.2}s - {:.2}s] row {} \"{}\"",
            clip.id, clip.start, clip.end, clip.source_start, clip.source_end, clip.row, clip.name
        );
    }
    println!("Overlays:");
    if timeline.overlays().is_empty() {
        println!("  (none)");
    }
    for overlay in timeline.overlays() {
        println!(
            "  {} {} [{:.2}s - {:.2}s] row {} \"{}\"",
            overlay.id, overlay.kind, overlay.start_time, overlay.end_time, overlay.row, overlay.name
        );
    }
}
