use launchreel_common::LaunchreelError;

/// Failures reported by a media element.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaError {
    /// The host refused to start playback (e.g. autoplay policy).
    #[error("Play request rejected: {0}")]
    PlayRejected(String),

    #[error("Seek failed: {0}")]
    SeekFailed(String),
}

impl From<MediaError> for LaunchreelError {
    fn from(err: MediaError) -> Self {
        LaunchreelError::media(err.to_string())
    }
}
