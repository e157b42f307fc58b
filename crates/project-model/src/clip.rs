//! Video clips: placed windows of source media on the project timeline.

use serde::{Deserialize, Serialize};

use crate::event::InteractionEvent;
use crate::project::new_id;

/// A contiguous window of one source media file placed on the timeline.
///
/// `start`/`end` are project time; `source_start`/`source_end` are the
/// matching bounds inside the media file. Outside of an in-progress drag the
/// two spans have equal length: resizing trims the source, it never stretches
/// playback speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoClip {
    pub id: String,

    /// Project-time start (seconds).
    pub start: f64,

    /// Project-time end (seconds), always greater than `start`.
    pub end: f64,

    /// Media-time start (seconds).
    pub source_start: f64,

    /// Media-time end (seconds).
    pub source_end: f64,

    /// Display label.
    pub name: String,

    /// Layout lane, recomputed by row packing after every mutation.
    #[serde(default)]
    pub row: usize,

    /// Full length of the underlying media, when known. Bounds how far the
    /// right edge may be dragged back out after a trim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_duration: Option<f64>,

    /// Interaction events captured while recording, in source time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<InteractionEvent>,
}

impl VideoClip {
    /// A clip covering a whole media file, placed at project time zero.
    pub fn spanning(media: &MediaInfo) -> Self {
        Self {
            id: new_id("clip"),
            start: 0.0,
            end: media.duration,
            source_start: 0.0,
            source_end: media.duration,
            name: media.name.clone(),
            row: 0,
            media_duration: Some(media.duration),
            events: media.events.clone(),
        }
    }

    /// Project-time length.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Media-time length.
    pub fn source_duration(&self) -> f64 {
        self.source_end - self.source_start
    }

    /// Whether `time` lies strictly inside the clip (split/insert test).
    pub fn strictly_contains(&self, time: f64) -> bool {
        time > self.start && time < self.end
    }

    /// Whether `time` lies in `[start, end)` (playback test).
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Media position that corresponds to project time `time`.
    pub fn source_time_at(&self, time: f64) -> f64 {
        self.source_start + (time - self.start)
    }

    /// Project time at which media position `source_time` plays.
    pub fn project_time_of(&self, source_time: f64) -> f64 {
        self.start + (source_time - self.source_start)
    }

    /// Shift the clip along the project axis without touching its source window.
    pub fn shift(&mut self, delta: f64) {
        self.start += delta;
        self.end += delta;
    }
}

/// Metadata for an imported or recorded media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    /// File name shown as the initial clip label.
    pub name: String,

    /// MIME type reported by the provider (e.g. `video/webm`).
    pub mime: String,

    /// Duration in seconds.
    pub duration: f64,

    /// Native resolution.
    pub width: u32,
    pub height: u32,

    /// Click metadata for recordings.
    #[serde(default)]
    pub events: Vec<InteractionEvent>,
}

impl MediaInfo {
    /// Whether this media can become a timeline clip.
    pub fn is_video(&self) -> bool {
        self.mime.starts_with("video/") && self.duration > 0.0
    }
}
