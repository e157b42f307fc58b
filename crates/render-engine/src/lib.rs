//! LaunchReel Render Engine
//!
//! Offline export pipeline that composites the source media with the
//! timeline's overlays into a final video file.
//!
//! # Pipeline Architecture
//!
//! ```text
//! playback clock ── set time ──┐
//!                              ├── seek media to clip source time
//! source media ────────────────┘         │
//!                                        ├── grab RGBA frame
//! timeline overlays ── capture ──────────┘         │
//!                                                  ├── composite
//!                                                  ▼
//!                                   encode (H.264, keyframe every N)
//!                                                  │
//!                                                  ▼
//!                                             output.mp4
//! ```

pub mod compositor;
pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod frame;
pub mod overlay;

pub use compositor::{compute_compositions, ClipSample, FrameComposition};
pub use error::{ExportError, ExportResult};
pub use export::*;
pub use ffmpeg::{
    command_exists, ffmpeg_available, probe_media, FfmpegEncoder, FfmpegMediaSource, ProbedMedia,
};
pub use frame::{Frame, Rgba};
pub use overlay::{OverlayLayer, OverlayRegistry, OverlayRenderer, TimelineOverlayLayer};
