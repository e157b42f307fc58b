//! Time model: pure conversions between project time and display
//! coordinates, plus the lane packing shared by clips and overlays.
//!
//! The timeline is horizontally scrollable. At zoom `z` the visible window
//! covers `project_duration / z` seconds, and positions are expressed as a
//! percentage of that window.

/// Smallest zoom factor; zooming out never shows more than the whole project.
pub const MIN_ZOOM: f64 = 1.0;

/// Seconds covered by the visible timeline window.
pub fn visible_duration(project_duration: f64, zoom: f64) -> f64 {
    project_duration / zoom.max(MIN_ZOOM)
}

/// Absolute horizontal position of `time` as a percentage of the window.
pub fn project_to_percent(time: f64, visible_duration: f64) -> f64 {
    if visible_duration <= 0.0 {
        return 0.0;
    }
    time / visible_duration * 100.0
}

/// Inverse of [`project_to_percent`].
pub fn percent_to_project(percent: f64, visible_duration: f64) -> f64 {
    percent / 100.0 * visible_duration
}

/// Horizontal scale of a track `track_width_px` wide.
pub fn pixels_per_second(track_width_px: f64, visible_duration: f64) -> f64 {
    if visible_duration <= 0.0 {
        return 0.0;
    }
    track_width_px / visible_duration
}

/// Project time under a pointer `x_px` from the track's left edge, clamped
/// to the project. Used by ruler clicks and scrubbing.
pub fn time_at_pointer(x_px: f64, track_width_px: f64, project_duration: f64, zoom: f64) -> f64 {
    if track_width_px <= 0.0 {
        return 0.0;
    }
    let percent = x_px / track_width_px * 100.0;
    percent_to_project(percent, visible_duration(project_duration, zoom))
        .clamp(0.0, project_duration.max(0.0))
}

/// Greedy interval partitioning.
///
/// Items are visited in ascending start order (ties keep input order) and
/// each goes to the lowest lane whose latest end is at or before its start,
/// allowing `epsilon` seconds of overlap for floating-point touching. The
/// returned vector holds each item's lane, indexed like `items`.
pub fn row_pack<T>(
    items: &[T],
    start: impl Fn(&T) -> f64,
    end: impl Fn(&T) -> f64,
    epsilon: f64,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| start(&items[a]).total_cmp(&start(&items[b])));

    let mut lane_ends: Vec<f64> = Vec::new();
    let mut rows = vec![0; items.len()];

    for idx in order {
        let item_start = start(&items[idx]);
        let item_end = end(&items[idx]);
        match lane_ends
            .iter()
            .position(|&lane_end| item_start >= lane_end - epsilon)
        {
            Some(lane) => {
                lane_ends[lane] = item_end;
                rows[idx] = lane;
            }
            None => {
                lane_ends.push(item_end);
                rows[idx] = lane_ends.len() - 1;
            }
        }
    }

    rows
}

/// Number of lanes a packing uses.
pub fn lane_count(rows: &[usize]) -> usize {
    rows.iter().max().map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_percent_conversion_respects_zoom() {
        let visible = visible_duration(30.0, 2.0);
        assert!((visible - 15.0).abs() < 1e-12);
        assert!((project_to_percent(7.5, visible) - 50.0).abs() < 1e-12);
        assert!((percent_to_project(50.0, visible) - 7.5).abs() < 1e-12);
        assert_eq!(project_to_percent(3.0, 0.0), 0.0);
    }

    #[test]
    fn test_zoom_below_one_is_clamped() {
        assert!((visible_duration(20.0, 0.25) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_time_at_pointer_clamps_to_project() {
        assert!((time_at_pointer(500.0, 1000.0, 10.0, 1.0) - 5.0).abs() < 1e-12);
        assert!((time_at_pointer(500.0, 1000.0, 10.0, 2.0) - 2.5).abs() < 1e-12);
        assert_eq!(time_at_pointer(-40.0, 1000.0, 10.0, 1.0), 0.0);
        assert_eq!(time_at_pointer(4000.0, 1000.0, 10.0, 1.0), 10.0);
        assert!((pixels_per_second(1000.0, 10.0) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_row_pack_uses_minimum_lanes() {
        let ranges = [(0.0, 5.0), (3.0, 8.0), (6.0, 9.0)];
        let rows = row_pack(&ranges, |r| r.0, |r| r.1, 0.01);
        assert_eq!(rows, vec![0, 1, 0]);
        assert_eq!(lane_count(&rows), 2);
    }

    #[test]
    fn test_row_pack_tolerates_touching_edges() {
        let ranges = [(0.0, 5.0), (4.995, 8.0)];
        let rows = row_pack(&ranges, |r| r.0, |r| r.1, 0.01);
        assert_eq!(rows, vec![0, 0]);
    }

    #[test]
    fn test_row_pack_is_independent_of_input_order() {
        let ranges = [(6.0, 9.0), (3.0, 8.0), (0.0, 5.0)];
        let rows = row_pack(&ranges, |r| r.0, |r| r.1, 0.01);
        assert_eq!(rows, vec![0, 1, 0]);
        assert_eq!(lane_count(&[]), 0);
    }

    fn max_depth(ranges: &[(f64, f64)]) -> usize {
        ranges
            .iter()
            .map(|&(s, _)| ranges.iter().filter(|&&(a, b)| a <= s && s < b).count())
            .max()
            .unwrap_or(0)
    }

    proptest! {
        #[test]
        fn prop_row_pack_never_overlaps_within_a_lane(
            raw in prop::collection::vec((0u32..200, 1u32..60), 0..40)
        ) {
            let ranges: Vec<(f64, f64)> = raw
                .iter()
                .map(|&(s, d)| (s as f64 * 0.5, s as f64 * 0.5 + d as f64 * 0.5))
                .collect();
            let rows = row_pack(&ranges, |r| r.0, |r| r.1, 0.0);

            for i in 0..ranges.len() {
                for j in (i + 1)..ranges.len() {
                    if rows[i] == rows[j] {
                        let (a, b) = (ranges[i], ranges[j]);
                        prop_assert!(a.1 <= b.0 || b.1 <= a.0);
                    }
                }
            }
            prop_assert_eq!(lane_count(&rows), max_depth(&ranges));
        }
    }
}
