//! The persisted project document.
//!
//! A single JSON document captures the editable state of a project. It is
//! written last-write-wins by the auto-saver and never treated as the source
//! of truth for derived values: `project_duration` and each item's `row` are
//! recomputed on load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clip::VideoClip;
use crate::overlay::TimelineComponent;

/// Current document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Prop keys that may hold references to local media.
pub const ASSET_PROP_KEYS: [&str; 3] = ["videoSrc", "src", "poster"];

/// Top-level saved project state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    /// Schema version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Duration at save time; informational only.
    pub project_duration: f64,

    pub video_clips: Vec<VideoClip>,

    pub timeline_components: Vec<PersistedComponent>,

    /// Blob store id of the main media file.
    #[serde(default)]
    pub main_video_asset_id: Option<String>,

    /// Save time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// An overlay plus the blob ids backing its media props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedComponent {
    #[serde(flatten)]
    pub component: TimelineComponent,

    /// Prop key → blob store asset id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assets: BTreeMap<String, String>,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

impl ProjectDocument {
    /// Structural problems that would make the document unusable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];

        if self.video_clips.is_empty() {
            errors.push("Project has no video clips".to_string());
        }

        for clip in &self.video_clips {
            if clip.end <= clip.start {
                errors.push(format!("Clip {} has non-positive duration", clip.id));
            }
            if clip.start < 0.0 {
                errors.push(format!("Clip {} starts before zero", clip.id));
            }
            if (clip.source_duration() - clip.duration()).abs() > 1e-6 {
                errors.push(format!(
                    "Clip {} source span {:.3}s differs from timeline span {:.3}s",
                    clip.id,
                    clip.source_duration(),
                    clip.duration()
                ));
            }
        }

        for persisted in &self.timeline_components {
            let c = &persisted.component;
            if c.end_time <= c.start_time {
                errors.push(format!("Overlay {} has non-positive duration", c.id));
            }
            for key in persisted.assets.keys() {
                if !ASSET_PROP_KEYS.contains(&key.as_str()) {
                    errors.push(format!("Overlay {} references asset via unknown prop {key}", c.id));
                }
            }
        }

        errors
    }
}

/// Errors that can occur when working with project documents.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Parse error: {source}")]
    ParseError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

impl ProjectDocument {
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let doc: ProjectDocument = serde_json::from_str(json)?;
        let errors = doc.validate();
        if doc.video_clips.is_empty() {
            return Err(ProjectError::ValidationError {
                message: errors.join("; "),
            });
        }
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Generate a prefixed unique id such as `clip-3f2a…`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{OverlayKind, Props};
    use serde_json::json;

    fn clip(start: f64, end: f64) -> VideoClip {
        VideoClip {
            id: new_id("clip"),
            start,
            end,
            source_start: 0.0,
            source_end: end - start,
            name: "screen.webm".to_string(),
            row: 0,
            media_duration: None,
            events: vec![],
        }
    }

    fn document() -> ProjectDocument {
        let mut assets = BTreeMap::new();
        assets.insert("videoSrc".to_string(), "asset-1".to_string());
        ProjectDocument {
            version: DOCUMENT_VERSION.to_string(),
            project_duration: 10.0,
            video_clips: vec![clip(0.0, 10.0)],
            timeline_components: vec![PersistedComponent {
                component: TimelineComponent {
                    id: "camera-1".to_string(),
                    kind: OverlayKind::CameraOverlay,
                    name: "Camera".to_string(),
                    start_time: 1.0,
                    end_time: 4.0,
                    props: Props::new(),
                    row: 0,
                },
                assets,
            }],
            main_video_asset_id: Some("asset-0".to_string()),
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_new_id_is_prefixed_and_unique() {
        let a = new_id("clip");
        let b = new_id("clip");
        assert!(a.starts_with("clip-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_document_json_shape() {
        let value = serde_json::to_value(document()).unwrap();
        assert_eq!(value["projectDuration"], json!(10.0));
        assert_eq!(value["mainVideoAssetId"], json!("asset-0"));
        let component = &value["timelineComponents"][0];
        assert_eq!(component["type"], json!("camera-overlay"));
        assert_eq!(component["assets"]["videoSrc"], json!("asset-1"));
    }

    #[test]
    fn test_document_round_trip_through_json() {
        let doc = document();
        let parsed = ProjectDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(parsed, doc);
        assert!(parsed.validate().is_empty());
    }

    #[test]
    fn test_legacy_document_without_version_defaults() {
        let mut value = serde_json::to_value(document()).unwrap();
        value.as_object_mut().unwrap().remove("version");
        let parsed: ProjectDocument = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.version, DOCUMENT_VERSION);
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut doc = document();
        doc.video_clips[0].source_end = 4.0;
        doc.timeline_components[0].component.end_time = 0.5;
        let errors = doc.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("source span"));

        doc.video_clips.clear();
        assert!(ProjectDocument::from_json(&serde_json::to_string(&doc).unwrap()).is_err());
    }
}
