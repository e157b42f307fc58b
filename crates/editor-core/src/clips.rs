//! Clip operations: split, move, resize and delete.
//!
//! Every operation clamps its input before mutating, so a rejected or
//! out-of-range request never produces a negative-length clip or a source
//! window outside the media.

use launchreel_project_model::{new_id, VideoClip};

use crate::error::{EditError, EditResult};
use crate::timeline::Timeline;

/// Which edge of a clip a resize drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
}

impl Timeline {
    /// Split the clip under the playhead into two halves sharing one source.
    /// Returns the ids of the left and right halves.
    pub fn split(&mut self, at: f64) -> EditResult<(String, String)> {
        let index = self
            .clips
            .iter()
            .position(|c| c.strictly_contains(at))
            .ok_or(EditError::NothingToSplit)?;

        let original = self.clips.remove(index);
        let (left, right) = split_clip(&original, at);
        let ids = (left.id.clone(), right.id.clone());

        tracing::info!(
            clip = %original.id,
            at,
            left = %ids.0,
            right = %ids.1,
            "Split clip"
        );

        self.clips.push(left);
        self.clips.push(right);
        self.commit();
        Ok(ids)
    }

    /// Move a clip so it starts at `new_start` (clamped to zero), keeping
    /// its length and source window.
    pub fn move_clip(&mut self, id: &str, new_start: f64) -> EditResult<()> {
        let clip = self.clip_mut(id)?;
        let delta = new_start.max(0.0) - clip.start;
        clip.shift(delta);
        self.commit();
        Ok(())
    }

    /// Drag one edge of a clip to `value`, trimming or revealing source.
    pub fn resize_clip(&mut self, id: &str, edge: ResizeEdge, value: f64) -> EditResult<()> {
        let min_duration = self.tuning.min_clip_duration;
        let clip = self.clip_mut(id)?;
        match edge {
            ResizeEdge::Left => {
                // The source window cannot start before the media does.
                let lower = (clip.start - clip.source_start).max(0.0);
                let upper = clip.end - min_duration;
                let new_start = value.max(lower).min(upper);
                let delta = new_start - clip.start;
                clip.start = new_start;
                clip.source_start += delta;
            }
            ResizeEdge::Right => {
                // The right edge only trims; it never reveals source past
                // the current window.
                let lower = clip.start + min_duration;
                let upper = (clip.start + clip.source_duration()).max(lower);
                let new_end = value.max(lower).min(upper);
                clip.end = new_end;
                clip.source_end = clip.source_start + (new_end - clip.start);
            }
        }
        self.commit();
        Ok(())
    }

    /// Remove a clip. The last remaining clip cannot be deleted.
    pub fn delete_clip(&mut self, id: &str) -> EditResult<()> {
        self.delete_clips(&[id.to_string()])
    }

    /// Remove several clips at once. Rejected as a whole if it would leave
    /// the timeline empty.
    pub fn delete_clips(&mut self, ids: &[String]) -> EditResult<()> {
        if let Some(missing) = ids.iter().find(|id| self.clip(id).is_none()) {
            return Err(EditError::ClipNotFound(missing.clone()));
        }
        let remaining = self
            .clips
            .iter()
            .filter(|c| !ids.contains(&c.id))
            .count();
        if remaining == 0 {
            tracing::warn!("Refusing to delete the last clip");
            return Err(EditError::LastClip);
        }

        self.clips.retain(|c| !ids.contains(&c.id));
        self.commit();
        tracing::info!(count = ids.len(), remaining, "Deleted clips");
        Ok(())
    }

    fn clip_mut(&mut self, id: &str) -> EditResult<&mut VideoClip> {
        self.clips
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| EditError::ClipNotFound(id.to_string()))
    }
}

/// Cut `clip` at project time `at`, which must lie strictly inside it.
pub(crate) fn split_clip(clip: &VideoClip, at: f64) -> (VideoClip, VideoClip) {
    let source_at = clip.source_time_at(at);
    let left = VideoClip {
        id: new_id("clip"),
        end: at,
        source_end: source_at,
        name: format!("{} (1)", clip.name),
        ..clip.clone()
    };
    let right = VideoClip {
        id: new_id("clip"),
        start: at,
        source_start: source_at,
        name: format!("{} (2)", clip.name),
        ..clip.clone()
    };
    (left, right)
}
