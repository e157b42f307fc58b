//! The timeline aggregate.

use launchreel_common::EditorTuning;
use launchreel_project_model::{
    row_pack, visible_duration, MediaInfo, TimelineComponent, VideoClip, MIN_ZOOM,
};

use crate::clipboard::Clipboard;
use crate::error::{EditError, EditResult};
use crate::selection::Selection;

/// Largest supported zoom factor.
pub const MAX_ZOOM: f64 = 50.0;

/// Clips, overlays and the editing state around them.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub(crate) clips: Vec<VideoClip>,
    pub(crate) overlays: Vec<TimelineComponent>,
    pub(crate) project_duration: f64,
    pub(crate) zoom: f64,
    pub(crate) selection: Selection,
    pub(crate) clipboard: Option<Clipboard>,
    pub(crate) tuning: EditorTuning,
}

impl Timeline {
    /// Start a project from an uploaded file or a finished recording.
    pub fn from_media(media: &MediaInfo, tuning: EditorTuning) -> EditResult<Self> {
        if !media.is_video() {
            return Err(EditError::UnsupportedMedia {
                mime: media.mime.clone(),
            });
        }
        tracing::info!(
            name = %media.name,
            duration = media.duration,
            events = media.events.len(),
            "Creating timeline from media"
        );
        Self::from_parts(vec![VideoClip::spanning(media)], Vec::new(), tuning)
    }

    /// Rebuild a timeline from stored clips and overlays.
    pub fn from_parts(
        clips: Vec<VideoClip>,
        overlays: Vec<TimelineComponent>,
        tuning: EditorTuning,
    ) -> EditResult<Self> {
        if clips.is_empty() {
            return Err(EditError::NoClips);
        }
        let mut timeline = Self {
            clips,
            overlays,
            project_duration: 0.0,
            zoom: MIN_ZOOM,
            selection: Selection::default(),
            clipboard: None,
            tuning,
        };
        timeline.commit();
        Ok(timeline)
    }

    /// Replace the clip list with a single clip for newly imported media.
    /// Overlays are kept.
    pub fn import_media(&mut self, media: &MediaInfo) -> EditResult<()> {
        if !media.is_video() {
            return Err(EditError::UnsupportedMedia {
                mime: media.mime.clone(),
            });
        }
        self.clips = vec![VideoClip::spanning(media)];
        self.selection.clear();
        self.commit();
        Ok(())
    }

    pub fn clips(&self) -> &[VideoClip] {
        &self.clips
    }

    pub fn overlays(&self) -> &[TimelineComponent] {
        &self.overlays
    }

    pub fn clip(&self, id: &str) -> Option<&VideoClip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn overlay(&self, id: &str) -> Option<&TimelineComponent> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// Derived: the latest clip or overlay end.
    pub fn project_duration(&self) -> f64 {
        self.project_duration
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped to `[1, MAX_ZOOM]`.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Seconds visible in the scrollable timeline window.
    pub fn visible_duration(&self) -> f64 {
        visible_duration(self.project_duration, self.zoom)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    pub fn tuning(&self) -> &EditorTuning {
        &self.tuning
    }

    /// The clip playing at `time`: the first whose `[start, end)` holds it.
    pub fn active_clip_at(&self, time: f64) -> Option<&VideoClip> {
        self.clips.iter().find(|c| c.contains(time))
    }

    /// Overlays visible at `time`, in timeline order.
    pub fn active_overlays_at(&self, time: f64) -> impl Iterator<Item = &TimelineComponent> {
        self.overlays.iter().filter(move |o| o.is_active_at(time))
    }

    pub fn select_clip(&mut self, id: &str, multi: bool) -> EditResult<()> {
        if self.clip(id).is_none() {
            return Err(EditError::ClipNotFound(id.to_string()));
        }
        self.selection.select_clip(id, multi);
        Ok(())
    }

    pub fn select_overlay(&mut self, id: &str, multi: bool) -> EditResult<()> {
        if self.overlay(id).is_none() {
            return Err(EditError::OverlayNotFound(id.to_string()));
        }
        self.selection.select_overlay(id, multi);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Recompute every derived field. Called at the end of each mutation.
    pub(crate) fn commit(&mut self) {
        self.clips.sort_by(|a, b| a.start.total_cmp(&b.start));

        let clip_end = self.clips.iter().map(|c| c.end).fold(0.0_f64, f64::max);
        let overlay_end = self
            .overlays
            .iter()
            .map(|o| o.end_time)
            .fold(0.0_f64, f64::max);
        self.project_duration = clip_end.max(overlay_end);

        let epsilon = self.tuning.row_pack_epsilon;
        let clip_rows = row_pack(&self.clips, |c| c.start, |c| c.end, epsilon);
        for (clip, row) in self.clips.iter_mut().zip(clip_rows) {
            clip.row = row;
        }
        let overlay_rows = row_pack(&self.overlays, |o| o.start_time, |o| o.end_time, epsilon);
        for (overlay, row) in self.overlays.iter_mut().zip(overlay_rows) {
            overlay.row = row;
        }

        let clips = &self.clips;
        let overlays = &self.overlays;
        self.selection.retain(
            |id| clips.iter().any(|c| c.id == id),
            |id| overlays.iter().any(|o| o.id == id),
        );
    }

    /// End time for an overlay created at `start`, clamped to the project.
    /// When clamping would leave less than the minimum duration (placing at
    /// or past the end of the project), the full duration is kept and the
    /// project grows instead.
    pub(crate) fn clamped_end(&self, start: f64, duration: f64) -> f64 {
        let end = (start + duration).min(self.project_duration);
        if end - start < self.tuning.min_clip_duration {
            start + duration
        } else {
            end
        }
    }
}
