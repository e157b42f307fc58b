//! Copy and paste.

use launchreel_project_model::{new_id, TimelineComponent, VideoClip};

use crate::error::{EditError, EditResult};
use crate::timeline::Timeline;

/// A single clipboard slot, tagged by what it holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Clipboard {
    Clips(Vec<VideoClip>),
    Overlays(Vec<TimelineComponent>),
}

impl Clipboard {
    pub fn len(&self) -> usize {
        match self {
            Self::Clips(c) => c.len(),
            Self::Overlays(o) => o.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Timeline {
    /// Snapshot the selected clips or overlays, replacing the clipboard.
    pub fn copy(&mut self) -> EditResult<usize> {
        let payload = if !self.selection.clips().is_empty() {
            Clipboard::Clips(
                self.clips
                    .iter()
                    .filter(|c| self.selection.contains_clip(&c.id))
                    .cloned()
                    .collect(),
            )
        } else if !self.selection.overlays().is_empty() {
            Clipboard::Overlays(
                self.overlays
                    .iter()
                    .filter(|o| self.selection.contains_overlay(&o.id))
                    .cloned()
                    .collect(),
            )
        } else {
            return Err(EditError::NothingSelected);
        };

        let count = payload.len();
        tracing::debug!(count, "Copied to clipboard");
        self.clipboard = Some(payload);
        Ok(count)
    }

    /// Re-instantiate the clipboard at `at`. Every item starts at `at`;
    /// relative offsets between copied items are not kept. Returns the new
    /// ids, which become the selection.
    pub fn paste(&mut self, at: f64) -> EditResult<Vec<String>> {
        let at = at.max(0.0);
        let payload = match &self.clipboard {
            Some(payload) if !payload.is_empty() => payload.clone(),
            _ => return Err(EditError::EmptyClipboard),
        };

        let ids = match payload {
            Clipboard::Clips(clips) => {
                let mut ids = Vec::with_capacity(clips.len());
                for source in clips {
                    let duration = source.duration();
                    let clip = VideoClip {
                        id: new_id("clip"),
                        start: at,
                        end: at + duration,
                        name: format!("{} (Copy)", source.name),
                        ..source
                    };
                    ids.push(clip.id.clone());
                    self.clips.push(clip);
                }
                self.selection.set_clips(ids.clone());
                ids
            }
            Clipboard::Overlays(overlays) => {
                let mut ids = Vec::with_capacity(overlays.len());
                for source in overlays {
                    let end = self.clamped_end(at, source.duration());
                    let overlay = TimelineComponent {
                        id: new_id(source.kind.as_str()),
                        start_time: at,
                        end_time: end,
                        ..source
                    };
                    ids.push(overlay.id.clone());
                    self.overlays.push(overlay);
                }
                self.selection.set_overlays(ids.clone());
                ids
            }
        };

        self.commit();
        tracing::info!(count = ids.len(), at, "Pasted from clipboard");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchreel_common::EditorTuning;
    use launchreel_project_model::{OverlayKind, Props};

    fn clip(id: &str, start: f64, end: f64) -> VideoClip {
        VideoClip {
            id: id.to_string(),
            start,
            end,
            source_start: 0.0,
            source_end: end - start,
            name: "screen".to_string(),
            row: 0,
            media_duration: Some(end - start),
            events: vec![],
        }
    }

    fn overlay(id: &str, start: f64, end: f64) -> TimelineComponent {
        TimelineComponent {
            id: id.to_string(),
            kind: OverlayKind::FloatingText,
            name: "Text".to_string(),
            start_time: start,
            end_time: end,
            props: Props::new(),
            row: 0,
        }
    }

    fn timeline() -> Timeline {
        Timeline::from_parts(
            vec![clip("c1", 0.0, 20.0)],
            vec![overlay("o1", 1.0, 4.0)],
            EditorTuning::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_copy_paste_overlay_creates_new_instance() {
        let mut tl = timeline();
        tl.select_overlay("o1", false).unwrap();
        assert_eq!(tl.copy().unwrap(), 1);

        let ids = tl.paste(8.0).unwrap();
        assert_eq!(ids.len(), 1);
        assert_ne!(ids[0], "o1");

        let pasted = tl.overlay(&ids[0]).unwrap();
        assert_eq!((pasted.start_time, pasted.end_time), (8.0, 11.0));
        let original = tl.overlay("o1").unwrap();
        assert_eq!((original.start_time, original.end_time), (1.0, 4.0));
        assert!(tl.selection().contains_overlay(&ids[0]));
    }

    #[test]
    fn test_paste_overlay_clamps_to_project_end() {
        let mut tl = timeline();
        tl.select_overlay("o1", false).unwrap();
        tl.copy().unwrap();
        let ids = tl.paste(18.5).unwrap();
        let pasted = tl.overlay(&ids[0]).unwrap();
        assert_eq!(pasted.end_time, 20.0);
        assert_eq!(tl.project_duration(), 20.0);
    }

    #[test]
    fn test_paste_clip_suffixes_name_and_extends_duration() {
        let mut tl = timeline();
        tl.select_clip("c1", false).unwrap();
        tl.copy().unwrap();
        let ids = tl.paste(15.0).unwrap();

        let pasted = tl.clip(&ids[0]).unwrap();
        assert_eq!(pasted.name, "screen (Copy)");
        assert_eq!((pasted.start, pasted.end), (15.0, 35.0));
        assert_eq!(tl.project_duration(), 35.0);
        assert_eq!(pasted.row, 1);
    }

    #[test]
    fn test_paste_multiple_items_stacks_at_same_time() {
        let mut tl = Timeline::from_parts(
            vec![clip("c1", 0.0, 20.0)],
            vec![overlay("a", 1.0, 2.0), overlay("b", 5.0, 7.0)],
            EditorTuning::default(),
        )
        .unwrap();
        tl.select_overlay("a", true).unwrap();
        tl.select_overlay("b", true).unwrap();
        tl.copy().unwrap();
        let ids = tl.paste(10.0).unwrap();
        for id in &ids {
            assert_eq!(tl.overlay(id).unwrap().start_time, 10.0);
        }
    }

    #[test]
    fn test_empty_clipboard_and_selection_are_rejected() {
        let mut tl = timeline();
        assert_eq!(tl.paste(1.0), Err(EditError::EmptyClipboard));
        assert_eq!(tl.copy(), Err(EditError::NothingSelected));
    }
}
