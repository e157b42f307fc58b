//! Interaction events captured alongside a screen recording.
//!
//! Positions are percentages of the recorded viewport (`0.0..=100.0`) and
//! `time` is seconds since the recording started, which is the same axis as
//! source time for the resulting media file.

use serde::{Deserialize, Serialize};

/// Event type tag for mouse clicks.
pub const CLICK_EVENT: &str = "click";

/// A single recorded interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Event type tag (`"click"` for clicks).
    #[serde(rename = "type")]
    pub kind: String,

    /// Horizontal position, percent of viewport width.
    pub x: f64,

    /// Vertical position, percent of viewport height.
    pub y: f64,

    /// Seconds since recording start.
    pub time: f64,
}

impl InteractionEvent {
    /// Create a click event.
    pub fn click(x: f64, y: f64, time: f64) -> Self {
        Self {
            kind: CLICK_EVENT.to_string(),
            x,
            y,
            time,
        }
    }

    pub fn is_click(&self) -> bool {
        self.kind == CLICK_EVENT
    }
}

/// Parse the JSON array a recorder writes next to its media file.
pub fn parse_events(json: &str) -> Result<Vec<InteractionEvent>, serde_json::Error> {
    let mut events: Vec<InteractionEvent> = serde_json::from_str(json)?;
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(events)
}

/// Click events whose recorded time falls inside `[source_start, source_end]`.
pub fn clicks_in_window(
    events: &[InteractionEvent],
    source_start: f64,
    source_end: f64,
) -> impl Iterator<Item = &InteractionEvent> {
    events
        .iter()
        .filter(move |e| e.is_click() && e.time >= source_start && e.time <= source_end)
}
