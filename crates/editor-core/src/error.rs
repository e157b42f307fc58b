//! Rejections raised by edit operations.

use launchreel_common::LaunchreelError;
use launchreel_project_model::TemplateError;

/// An edit the timeline refused. State is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("No video clip at playhead to split")]
    NothingToSplit,

    #[error("Cannot delete the last clip")]
    LastClip,

    #[error("A timeline needs at least one clip")]
    NoClips,

    #[error("Clipboard is empty")]
    EmptyClipboard,

    #[error("Nothing is selected")]
    NothingSelected,

    #[error("Clip not found: {0}")]
    ClipNotFound(String),

    #[error("Overlay not found: {0}")]
    OverlayNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Unsupported media type {mime}: only video files can be imported")]
    UnsupportedMedia { mime: String },
}

pub type EditResult<T> = Result<T, EditError>;

impl From<TemplateError> for EditError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::NotFound { id } => Self::TemplateNotFound(id),
            other => Self::TemplateNotFound(other.to_string()),
        }
    }
}

impl From<EditError> for LaunchreelError {
    fn from(err: EditError) -> Self {
        LaunchreelError::edit(err.to_string())
    }
}
