//! Pointer drag sessions for moving and trimming timeline items.
//!
//! A session is created on pointer-down and dropped on pointer-up. Each
//! pointer-move recomputes the candidate value from the press anchor rather
//! than from the previous sample, so rounding never accumulates, and every
//! intermediate state is a fully clamped, committed timeline.

use launchreel_project_model::{pixels_per_second, OverlayKind, VideoClip};

use crate::clips::ResizeEdge;
use crate::error::{EditError, EditResult};
use crate::timeline::Timeline;

/// What the pointer grabbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragTarget {
    Clip(String),
    Overlay(String),
}

/// Which handle the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    ResizeLeft,
    ResizeRight,
}

#[derive(Debug, Clone, PartialEq)]
enum Origin {
    Clip(VideoClip),
    Overlay {
        start: f64,
        end: f64,
        /// Bounds of everything a freeze-frame retime can shift.
        ripple: Option<RippleSnapshot>,
    },
}

/// Project-time bounds of every clip and overlay at pointer-down.
#[derive(Debug, Clone, PartialEq)]
struct RippleSnapshot {
    clips: Vec<(String, f64, f64)>,
    overlays: Vec<(String, f64, f64)>,
}

/// State captured at pointer-down.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    target: DragTarget,
    kind: DragKind,
    anchor_x: f64,
    anchor_value: f64,
    pixels_per_second: f64,
    origin: Origin,
}

impl DragSession {
    pub fn target(&self) -> &DragTarget {
        &self.target
    }

    pub fn kind(&self) -> DragKind {
        self.kind
    }

    /// Candidate time for a pointer at `pointer_x`.
    fn value_at(&self, pointer_x: f64) -> f64 {
        if self.pixels_per_second <= 0.0 {
            return self.anchor_value;
        }
        self.anchor_value + (pointer_x - self.anchor_x) / self.pixels_per_second
    }
}

impl Timeline {
    /// Start a drag on `target` with the pointer at `pointer_x` on a track
    /// `track_width_px` wide.
    pub fn begin_drag(
        &self,
        target: DragTarget,
        kind: DragKind,
        pointer_x: f64,
        track_width_px: f64,
    ) -> EditResult<DragSession> {
        let origin = match &target {
            DragTarget::Clip(id) => Origin::Clip(
                self.clip(id)
                    .cloned()
                    .ok_or_else(|| EditError::ClipNotFound(id.clone()))?,
            ),
            DragTarget::Overlay(id) => {
                let overlay = self
                    .overlay(id)
                    .ok_or_else(|| EditError::OverlayNotFound(id.clone()))?;
                let ripple = (overlay.kind == OverlayKind::FreezeFrame).then(|| RippleSnapshot {
                    clips: self
                        .clips
                        .iter()
                        .map(|c| (c.id.clone(), c.start, c.end))
                        .collect(),
                    overlays: self
                        .overlays
                        .iter()
                        .map(|o| (o.id.clone(), o.start_time, o.end_time))
                        .collect(),
                });
                Origin::Overlay {
                    start: overlay.start_time,
                    end: overlay.end_time,
                    ripple,
                }
            }
        };

        let (start, end) = match &origin {
            Origin::Clip(clip) => (clip.start, clip.end),
            Origin::Overlay { start, end, .. } => (*start, *end),
        };
        let anchor_value = match kind {
            DragKind::Move | DragKind::ResizeLeft => start,
            DragKind::ResizeRight => end,
        };

        tracing::debug!(?target, ?kind, pointer_x, "Drag started");
        Ok(DragSession {
            target,
            kind,
            anchor_x: pointer_x,
            anchor_value,
            pixels_per_second: pixels_per_second(track_width_px, self.visible_duration()),
            origin,
        })
    }

    /// Apply a pointer-move sample.
    pub fn drag_to(&mut self, session: &DragSession, pointer_x: f64) -> EditResult<()> {
        let value = session.value_at(pointer_x);
        let min_duration = self.tuning.min_clip_duration;

        match (&session.target, &session.origin) {
            (DragTarget::Clip(id), Origin::Clip(origin)) => match session.kind {
                DragKind::Move => self.move_clip(id, value),
                DragKind::ResizeLeft | DragKind::ResizeRight => {
                    self.restore_clip(origin)?;
                    let edge = if session.kind == DragKind::ResizeLeft {
                        ResizeEdge::Left
                    } else {
                        ResizeEdge::Right
                    };
                    self.resize_clip(id, edge, value)
                }
            },
            (DragTarget::Overlay(id), Origin::Overlay { start, end, ripple }) => {
                let (new_start, new_end) = match session.kind {
                    DragKind::Move => {
                        let new_start = value.max(0.0);
                        (new_start, new_start + (end - start))
                    }
                    DragKind::ResizeLeft => (value.min(end - min_duration), *end),
                    DragKind::ResizeRight => (*start, value.max(start + min_duration)),
                };
                // Ripple once from the pointer-down layout, not from the
                // previous sample.
                if let Some(snapshot) = ripple {
                    self.restore_layout(snapshot);
                }
                self.update_timing(id, new_start, new_end)
            }
            _ => Ok(()),
        }
    }

    /// Finish a drag. The last sample is already committed.
    pub fn end_drag(&mut self, session: DragSession) {
        tracing::debug!(target = ?session.target, kind = ?session.kind, "Drag finished");
    }

    fn restore_layout(&mut self, snapshot: &RippleSnapshot) {
        for (id, start, end) in &snapshot.clips {
            if let Some(clip) = self.clips.iter_mut().find(|c| &c.id == id) {
                clip.start = *start;
                clip.end = *end;
            }
        }
        for (id, start, end) in &snapshot.overlays {
            if let Some(overlay) = self.overlays.iter_mut().find(|o| &o.id == id) {
                overlay.start_time = *start;
                overlay.end_time = *end;
            }
        }
    }

    fn restore_clip(&mut self, origin: &VideoClip) -> EditResult<()> {
        let clip = self
            .clips
            .iter_mut()
            .find(|c| c.id == origin.id)
            .ok_or_else(|| EditError::ClipNotFound(origin.id.clone()))?;
        clip.start = origin.start;
        clip.end = origin.end;
        clip.source_start = origin.source_start;
        clip.source_end = origin.source_end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchreel_common::EditorTuning;
    use launchreel_project_model::{OverlayKind, Props, TimelineComponent};
    use proptest::prelude::*;

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

    fn timeline() -> Timeline {
        // 10s project on a 1000px track: 100px per second.
        Timeline::from_parts(
            vec![clip("c1", 0.0, 10.0)],
            vec![TimelineComponent {
                id: "o1".to_string(),
                kind: OverlayKind::Terminal,
                name: "Terminal".to_string(),
                start_time: 2.0,
                end_time: 4.0,
                props: Props::new(),
                row: 0,
            }],
            EditorTuning::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_drag_move_is_relative_to_anchor() {
        let mut tl = timeline();
        let session = tl
            .begin_drag(DragTarget::Overlay("o1".into()), DragKind::Move, 500.0, 1000.0)
            .unwrap();
        tl.drag_to(&session, 600.0).unwrap();
        tl.drag_to(&session, 650.0).unwrap();
        let o = tl.overlay("o1").unwrap();
        assert!((o.start_time - 3.5).abs() < 1e-9);
        assert!((o.end_time - 5.5).abs() < 1e-9);
        tl.end_drag(session);
    }

    #[test]
    fn test_drag_move_clamps_at_zero() {
        let mut tl = timeline();
        let session = tl
            .begin_drag(DragTarget::Overlay("o1".into()), DragKind::Move, 500.0, 1000.0)
            .unwrap();
        tl.drag_to(&session, -2000.0).unwrap();
        let o = tl.overlay("o1").unwrap();
        assert_eq!((o.start_time, o.end_time), (0.0, 2.0));
    }

    #[test]
    fn test_overlay_resize_left_never_crosses_end() {
        let mut tl = timeline();
        let session = tl
            .begin_drag(DragTarget::Overlay("o1".into()), DragKind::ResizeLeft, 200.0, 1000.0)
            .unwrap();
        tl.drag_to(&session, 900.0).unwrap();
        let o = tl.overlay("o1").unwrap();
        assert!(o.end_time > o.start_time);
        assert!((o.end_time - 4.0).abs() < 1e-9);
        assert!((o.start_time - 3.9).abs() < 1e-9);
    }

    #[test]
    fn test_clip_resize_right_drag() {
        let mut tl = timeline();
        let session = tl
            .begin_drag(DragTarget::Clip("c1".into()), DragKind::ResizeRight, 1000.0, 1000.0)
            .unwrap();
        tl.drag_to(&session, 400.0).unwrap();
        assert_eq!(tl.clip("c1").unwrap().end, 4.0);
        tl.drag_to(&session, 700.0).unwrap();
        let c = tl.clip("c1").unwrap();
        assert_eq!((c.end, c.source_end), (7.0, 7.0));
    }

    #[test]
    fn test_freeze_frame_drag_depends_only_on_anchor() {
        let freeze = TimelineComponent {
            id: "freeze".to_string(),
            kind: OverlayKind::FreezeFrame,
            name: "Freeze".to_string(),
            start_time: 5.0,
            end_time: 7.0,
            props: Props::new(),
            row: 0,
        };
        let late = TimelineComponent {
            id: "x".to_string(),
            kind: OverlayKind::FloatingText,
            name: "Text".to_string(),
            start_time: 6.8,
            end_time: 7.5,
            props: Props::new(),
            row: 1,
        };
        let mut right = clip("c2", 7.0, 12.0);
        right.source_start = 5.0;
        right.source_end = 10.0;
        let mut tl = Timeline::from_parts(
            vec![clip("c1", 0.0, 5.0), right],
            vec![freeze, late],
            EditorTuning::default(),
        )
        .unwrap();

        // 12s on 1200px: 100px per second; the right handle sits at 700px.
        let session = tl
            .begin_drag(DragTarget::Overlay("freeze".into()), DragKind::ResizeRight, 700.0, 1200.0)
            .unwrap();
        tl.drag_to(&session, 650.0).unwrap();
        assert!((tl.clip("c2").unwrap().start - 6.5).abs() < 1e-9);
        assert!((tl.overlay("x").unwrap().start_time - 6.8).abs() < 1e-9);

        tl.drag_to(&session, 700.0).unwrap();
        tl.end_drag(session);

        let f = tl.overlay("freeze").unwrap();
        assert!((f.end_time - 7.0).abs() < 1e-9);
        let x = tl.overlay("x").unwrap();
        assert!((x.start_time - 6.8).abs() < 1e-9);
        assert!((x.end_time - 7.5).abs() < 1e-9);
        let c2 = tl.clip("c2").unwrap();
        assert!((c2.start - 7.0).abs() < 1e-9);
        assert!((c2.end - 12.0).abs() < 1e-9);
        assert!((tl.project_duration() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_begin_drag_unknown_target() {
        let tl = timeline();
        let err = tl
            .begin_drag(DragTarget::Clip("zz".into()), DragKind::Move, 0.0, 1000.0)
            .unwrap_err();
        assert_eq!(err, EditError::ClipNotFound("zz".to_string()));
    }

    proptest! {
        #[test]
        fn prop_drag_samples_keep_clip_consistent(
            kind in prop::sample::select(vec![DragKind::Move, DragKind::ResizeLeft, DragKind::ResizeRight]),
            press in 0.0f64..1000.0,
            samples in prop::collection::vec(-3000.0f64..3000.0, 1..20),
        ) {
            let mut tl = timeline();
            let session = tl
                .begin_drag(DragTarget::Clip("c1".into()), kind, press, 1000.0)
                .unwrap();
            for x in samples {
                tl.drag_to(&session, x).unwrap();
                let c = tl.clip("c1").unwrap();
                prop_assert!(c.start >= 0.0);
                prop_assert!(c.end > c.start);
                prop_assert!(c.source_start >= 0.0);
                prop_assert!(c.source_end <= 10.0 + 1e-9);
                prop_assert!(((c.end - c.start) - (c.source_end - c.source_start)).abs() < 1e-9);
            }
        }
    }
}
