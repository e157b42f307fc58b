//! Per-frame composition plan.
//!
//! Resolves, for every export frame, which clip supplies the picture (and at
//! what source time) and which overlays are drawn over it. The exporter walks
//! this plan; it is also written out as a JSON report for inspection.

use serde::Serialize;

use launchreel_common::FrameRate;
use launchreel_project_model::{TimelineComponent, VideoClip};

/// A single frame's composition instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameComposition {
    /// Frame number.
    pub frame_index: u64,

    /// Project time in seconds.
    pub time_secs: f64,

    /// Presentation timestamp in microseconds.
    pub timestamp_us: u64,

    /// Whether the encoder is asked for a keyframe here.
    pub keyframe: bool,

    /// Clip supplying the picture. `None` inside a gap, where the last
    /// decoded picture is held.
    pub clip: Option<ClipSample>,

    /// Ids of overlays visible at this time, bottom row first.
    pub overlays: Vec<String>,
}

/// Where the picture for a frame comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipSample {
    pub clip_id: String,
    pub source_time: f64,
}

/// Compute the composition for each frame of a `duration_secs` export.
pub fn compute_compositions(
    clips: &[VideoClip],
    overlays: &[TimelineComponent],
    rate: FrameRate,
    keyframe_interval: u64,
    duration_secs: f64,
) -> Vec<FrameComposition> {
    let total_frames = rate.frame_count(duration_secs);
    let mut compositions = Vec::with_capacity(total_frames as usize);

    for frame in 0..total_frames {
        compositions.push(compose_frame(clips, overlays, rate, keyframe_interval, frame));
    }

    compositions
}

/// Composition for a single frame.
pub fn compose_frame(
    clips: &[VideoClip],
    overlays: &[TimelineComponent],
    rate: FrameRate,
    keyframe_interval: u64,
    frame: u64,
) -> FrameComposition {
    let time_secs = rate.frame_time(frame);
    let clip = clip_sample_at(clips, time_secs);

    let mut visible: Vec<&TimelineComponent> =
        overlays.iter().filter(|o| o.is_active_at(time_secs)).collect();
    visible.sort_by_key(|o| o.row);

    FrameComposition {
        frame_index: frame,
        time_secs,
        timestamp_us: rate.frame_timestamp_us(frame),
        keyframe: is_keyframe(frame, keyframe_interval),
        clip,
        overlays: visible.into_iter().map(|o| o.id.clone()).collect(),
    }
}

/// The clip playing at project time `time` and the matching source time.
pub fn clip_sample_at(clips: &[VideoClip], time: f64) -> Option<ClipSample> {
    clips.iter().find(|c| c.contains(time)).map(|c| ClipSample {
        clip_id: c.id.clone(),
        source_time: c.source_time_at(time),
    })
}

/// Every `interval`th frame, starting at frame 0, is a keyframe.
pub fn is_keyframe(frame: u64, interval: u64) -> bool {
    interval > 0 && frame % interval == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchreel_project_model::OverlayKind;

    fn clip(id: &str, start: f64, end: f64, source_start: f64) -> VideoClip {
        VideoClip {
            id: id.to_string(),
            start,
            end,
            source_start,
            source_end: source_start + (end - start),
            name: id.to_string(),
            row: 0,
            media_duration: None,
            events: vec![],
        }
    }

    #[test]
    fn test_frame_count_and_timestamps() {
        let plan = compute_compositions(&[clip("a", 0.0, 2.0, 0.0)], &[], FrameRate::new(30), 30, 2.0);
        assert_eq!(plan.len(), 60);
        assert_eq!(plan[1].timestamp_us, 33_333);
        assert_eq!(plan[59].timestamp_us, 59 * 33_333);
        assert!(plan[0].keyframe && plan[30].keyframe);
        assert!(!plan[29].keyframe);
    }

    #[test]
    fn test_partial_final_frame_rounds_up() {
        let plan = compute_compositions(&[], &[], FrameRate::new(30), 30, 1.01);
        assert_eq!(plan.len(), 31);
    }

    #[test]
    fn test_gap_frames_have_no_clip() {
        let clips = [clip("a", 0.0, 5.0, 0.0), clip("b", 7.0, 12.0, 5.0)];
        let rate = FrameRate::new(30);
        assert_eq!(compose_frame(&clips, &[], rate, 30, 180).clip, None);

        let after = compose_frame(&clips, &[], rate, 30, 240).clip.unwrap();
        assert_eq!(after.clip_id, "b");
        assert!((after.source_time - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlays_listed_bottom_row_first() {
        let overlay = |id: &str, row: usize| TimelineComponent {
            id: id.to_string(),
            kind: OverlayKind::CalloutBubble,
            name: id.to_string(),
            start_time: 0.0,
            end_time: 2.0,
            props: Default::default(),
            row,
        };
        let frame = compose_frame(
            &[],
            &[overlay("top", 1), overlay("bottom", 0)],
            FrameRate::new(30),
            30,
            3,
        );
        assert_eq!(frame.overlays, vec!["bottom", "top"]);
    }
}
