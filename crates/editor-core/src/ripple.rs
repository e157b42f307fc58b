//! Ripple edits that touch clips and overlays together.
//!
//! A freeze-frame inserts dead project time: everything at or after the
//! insertion point slides later by the freeze duration. Both stores are
//! shifted inside one `&mut Timeline` call and committed once, so no reader
//! observes clips moved without their overlays.

use launchreel_project_model::{clicks_in_window, OverlayTemplate, Props};
use serde_json::json;

use crate::clips::split_clip;
use crate::timeline::Timeline;

impl Timeline {
    /// Open a gap of `duration` at `at` and fill it with a freeze-frame
    /// overlay. A clip spanning `at` is split first so its second half
    /// moves with the rest. Callers commit.
    pub(crate) fn insert_freeze_frame(
        &mut self,
        template: &OverlayTemplate,
        at: f64,
        duration: f64,
        mut props: Props,
    ) -> String {
        if let Some(index) = self.clips.iter().position(|c| c.strictly_contains(at)) {
            let original = self.clips.remove(index);
            let (left, right) = split_clip(&original, at);
            self.clips.push(left);
            self.clips.push(right);
        }

        self.shift_from(at, duration, None);

        props.insert("duration".to_string(), json!(duration));
        let id = self.push_overlay(template, at, duration, props);
        // The gap is exactly as long as the freeze; never clamp it.
        if let Some(freeze) = self.overlays.iter_mut().find(|o| o.id == id) {
            freeze.end_time = at + duration;
        }

        tracing::info!(freeze = %id, at, duration, "Inserted freeze frame");
        id
    }

    /// Apply new bounds to a freeze-frame, rippling the change in length
    /// through everything that started at or after its old end. Callers
    /// commit.
    pub(crate) fn retime_freeze_frame(&mut self, id: &str, start_time: f64, end_time: f64) {
        let Some(freeze) = self.overlays.iter_mut().find(|o| o.id == id) else {
            return;
        };
        let old_end = freeze.end_time;
        let delta = (end_time - start_time) - freeze.duration();
        freeze.start_time = start_time;
        freeze.end_time = end_time;
        freeze
            .props
            .insert("duration".to_string(), json!(end_time - start_time));

        if delta != 0.0 {
            self.shift_from(old_end, delta, Some(id));
            tracing::debug!(freeze = %id, delta, "Rippled freeze frame duration");
        }
    }

    /// Create one short ripple per recorded click inside the source window
    /// of the clip playing at `at`. Returns the new ids; empty when the clip
    /// has no clicks. Callers commit.
    pub(crate) fn place_click_ripples(
        &mut self,
        template: &OverlayTemplate,
        at: f64,
        props: &Props,
    ) -> Vec<String> {
        let Some(clip) = self.active_clip_at(at) else {
            return Vec::new();
        };
        let placements: Vec<(f64, f64, f64)> =
            clicks_in_window(&clip.events, clip.source_start, clip.source_end)
                .map(|event| (clip.project_time_of(event.time), event.x, event.y))
                .collect();

        let duration = self.tuning.ripple_duration;
        let mut ids = Vec::with_capacity(placements.len());
        for (start, x, y) in placements {
            let mut ripple_props = props.clone();
            ripple_props.insert("x".to_string(), json!(x));
            ripple_props.insert("y".to_string(), json!(y));
            ripple_props.insert("duration".to_string(), json!(duration));
            ids.push(self.push_overlay(template, start, duration, ripple_props));
        }
        if !ids.is_empty() {
            tracing::info!(count = ids.len(), "Placed click ripples from recording");
        }
        ids
    }

    /// Shift every clip and overlay starting at or after `from` by `delta`.
    fn shift_from(&mut self, from: f64, delta: f64, except: Option<&str>) {
        for clip in self.clips.iter_mut().filter(|c| c.start >= from) {
            clip.shift(delta);
        }
        for overlay in self
            .overlays
            .iter_mut()
            .filter(|o| o.start_time >= from && Some(o.id.as_str()) != except)
        {
            overlay.shift(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchreel_common::EditorTuning;
    use launchreel_project_model::{
        InteractionEvent, OverlayKind, TemplateLibrary, TimelineComponent, VideoClip,
    };

    fn clip(start: f64, end: f64, events: Vec<InteractionEvent>) -> VideoClip {
        VideoClip {
            id: "c1".to_string(),
            start,
            end,
            source_start: 0.0,
            source_end: end - start,
            name: "screen".to_string(),
            row: 0,
            media_duration: Some(end - start),
            events,
        }
    }

    fn duration_props(duration: f64) -> Props {
        let mut props = Props::new();
        props.insert("duration".to_string(), json!(duration));
        props
    }

    #[test]
    fn test_freeze_at_clip_boundary_does_not_split() {
        let mut tl = Timeline::from_parts(
            vec![clip(0.0, 10.0, vec![])],
            vec![],
            EditorTuning::default(),
        )
        .unwrap();
        let library = TemplateLibrary::new();
        tl.add_overlay(&library, &"freeze-frame".into(), 10.0, Some(duration_props(2.0)))
            .unwrap();
        assert_eq!(tl.clips().len(), 1);
        assert_eq!(tl.project_duration(), 12.0);
    }

    #[test]
    fn test_freeze_duration_edit_ripples() {
        let mut tl = Timeline::from_parts(
            vec![clip(0.0, 10.0, vec![])],
            vec![TimelineComponent {
                id: "late".to_string(),
                kind: OverlayKind::FloatingText,
                name: "Text".to_string(),
                start_time: 8.0,
                end_time: 9.0,
                props: Props::new(),
                row: 0,
            }],
            EditorTuning::default(),
        )
        .unwrap();
        let library = TemplateLibrary::new();
        let freeze = tl
            .add_overlay(&library, &"freeze-frame".into(), 5.0, Some(duration_props(2.0)))
            .unwrap()
            .remove(0);
        assert_eq!(tl.overlay("late").unwrap().start_time, 10.0);

        tl.update_props(&freeze, duration_props(3.0)).unwrap();
        let f = tl.overlay(&freeze).unwrap();
        assert_eq!((f.start_time, f.end_time), (5.0, 8.0));
        assert_eq!(f.prop_f64("duration"), Some(3.0));
        assert_eq!(tl.overlay("late").unwrap().start_time, 11.0);
        assert_eq!(tl.project_duration(), 13.0);

        tl.update_timing(&freeze, 5.0, 6.0).unwrap();
        assert_eq!(tl.overlay("late").unwrap().start_time, 9.0);
        assert_eq!(tl.project_duration(), 11.0);
    }

    #[test]
    fn test_ripple_effect_placed_per_click() {
        let events = vec![
            InteractionEvent::click(10.0, 20.0, 1.0),
            InteractionEvent::click(30.0, 40.0, 6.0),
            InteractionEvent {
                kind: "move".to_string(),
                x: 0.0,
                y: 0.0,
                time: 2.0,
            },
        ];
        let mut recording = clip(0.0, 10.0, events);
        recording.start = 2.0;
        recording.end = 7.0;
        recording.source_start = 0.0;
        recording.source_end = 5.0;
        let mut tl = Timeline::from_parts(vec![recording], vec![], EditorTuning::default())
            .unwrap();

        let ids = tl
            .add_overlay(&TemplateLibrary::new(), &"ripple-effect".into(), 3.0, None)
            .unwrap();
        // The click at source 6.0 falls outside the trimmed window.
        assert_eq!(ids.len(), 1);
        let ripple = tl.overlay(&ids[0]).unwrap();
        assert_eq!(ripple.start_time, 3.0);
        assert!((ripple.duration() - 0.6).abs() < 1e-9);
        assert_eq!(ripple.props["x"], json!(10.0));
        assert_eq!(ripple.props["y"], json!(20.0));
    }

    #[test]
    fn test_ripple_effect_without_clicks_adds_default() {
        let mut tl = Timeline::from_parts(
            vec![clip(0.0, 10.0, vec![])],
            vec![],
            EditorTuning::default(),
        )
        .unwrap();
        let ids = tl
            .add_overlay(&TemplateLibrary::new(), &"ripple-effect".into(), 4.0, None)
            .unwrap();
        assert_eq!(ids.len(), 1);
        let ripple = tl.overlay(&ids[0]).unwrap();
        assert_eq!((ripple.start_time, ripple.end_time), (4.0, 5.0));
    }
}
