//! LaunchReel Playback
//!
//! Drives the authoritative project time and keeps a media element in step
//! with it:
//! - **Clock:** a Paused/Playing state machine advanced by per-frame ticks
//! - **Sync:** maps project time onto the active clip's source time and
//!   corrects the media element with asymmetric drift hysteresis

pub mod clock;
pub mod error;
pub mod sync;

pub use clock::{
    run_frames, FrameRequest, FrameScheduler, ManualScheduler, PlaybackClock, PlaybackState,
};
pub use error::MediaError;
pub use sync::{MediaElement, MediaSynchronizer, SyncAction};
