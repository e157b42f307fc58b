use launchreel_common::LaunchreelError;

/// Failures that abort an export. Per-frame overlay capture problems are
/// logged by the renderer and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Encoder configuration failed: {0}")]
    EncoderConfig(String),

    #[error("Encoder failed: {0}")]
    Encoder(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Overlay capture failed: {0}")]
    OverlayCapture(String),

    #[error("Invalid output size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Nothing to export: duration is {0}s")]
    EmptyTimeline(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

impl From<ExportError> for LaunchreelError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Io(e) => LaunchreelError::Io(e),
            other => LaunchreelError::render(other.to_string()),
        }
    }
}
