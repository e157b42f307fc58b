//! Timed overlay instances.
//!
//! The core never interprets an overlay's `props`: their shape belongs to the
//! renderer registered for the overlay's kind. The only exception is the
//! freeze-frame `duration` prop, which timing edits keep in step with the
//! overlay's span.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type-erased property bag.
pub type Props = Map<String, Value>;

/// Overlay type tag. Unknown tags round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OverlayKind {
    FloatingText,
    BrowserFrame,
    DeviceMockup,
    CalloutBubble,
    Terminal,
    TextHighlight,
    PremiumCursor,
    ProblemStatement,
    FreezeFrame,
    ZoomArea,
    RippleEffect,
    Audio,
    CameraOverlay,
    VideoOverlay,
    CustomCode,
    Other(String),
}

impl OverlayKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::FloatingText => "floating-text",
            Self::BrowserFrame => "browser-frame",
            Self::DeviceMockup => "device-mockup",
            Self::CalloutBubble => "callout-bubble",
            Self::Terminal => "terminal",
            Self::TextHighlight => "text-highlight",
            Self::PremiumCursor => "premium-cursor",
            Self::ProblemStatement => "problem-statement",
            Self::FreezeFrame => "freeze-frame",
            Self::ZoomArea => "zoom-area",
            Self::RippleEffect => "ripple-effect",
            Self::Audio => "audio",
            Self::CameraOverlay => "camera-overlay",
            Self::VideoOverlay => "video-overlay",
            Self::CustomCode => "custom-code",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for OverlayKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "floating-text" => Self::FloatingText,
            "browser-frame" => Self::BrowserFrame,
            "device-mockup" => Self::DeviceMockup,
            "callout-bubble" => Self::CalloutBubble,
            "terminal" => Self::Terminal,
            "text-highlight" => Self::TextHighlight,
            "premium-cursor" => Self::PremiumCursor,
            "problem-statement" => Self::ProblemStatement,
            "freeze-frame" => Self::FreezeFrame,
            "zoom-area" => Self::ZoomArea,
            "ripple-effect" => Self::RippleEffect,
            "audio" => Self::Audio,
            "camera-overlay" => Self::CameraOverlay,
            "video-overlay" => Self::VideoOverlay,
            "custom-code" => Self::CustomCode,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for OverlayKind {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<OverlayKind> for String {
    fn from(kind: OverlayKind) -> Self {
        match kind {
            OverlayKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timed overlay placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineComponent {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: OverlayKind,

    pub name: String,

    /// Project-time start (seconds).
    pub start_time: f64,

    /// Project-time end (seconds), always greater than `start_time`.
    pub end_time: f64,

    /// Opaque, kind-specific properties.
    #[serde(default)]
    pub props: Props,

    /// Layout lane, recomputed by row packing after every mutation.
    #[serde(default)]
    pub row: usize,
}

impl TimelineComponent {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whether the overlay is visible at `time` (inclusive on both ends).
    pub fn is_active_at(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }

    /// Fraction of the overlay's span elapsed at `time`, clamped to `[0, 1]`.
    pub fn progress_at(&self, time: f64) -> f64 {
        let duration = self.duration();
        if duration <= 0.0 {
            return 1.0;
        }
        ((time - self.start_time) / duration).clamp(0.0, 1.0)
    }

    pub fn shift(&mut self, delta: f64) {
        self.start_time += delta;
        self.end_time += delta;
    }

    /// Shallow-merge `partial` into the property bag.
    pub fn merge_props(&mut self, partial: Props) {
        for (key, value) in partial {
            self.props.insert(key, value);
        }
    }

    /// Numeric prop lookup.
    pub fn prop_f64(&self, key: &str) -> Option<f64> {
        self.props.get(key).and_then(Value::as_f64)
    }
}
