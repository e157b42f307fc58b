//! Overlay rasterization.
//!
//! Each overlay kind is drawn by an [`OverlayRenderer`] looked up in an
//! [`OverlayRegistry`]. Kinds without a renderer contribute nothing to the
//! frame. [`TimelineOverlayLayer`] draws every overlay active at a given
//! project time onto a transparent frame for the exporter.

use std::collections::{HashMap, HashSet};

use launchreel_project_model::{OverlayKind, TimelineComponent};

use crate::error::{ExportError, ExportResult};
use crate::frame::{Frame, Rgba};

/// Pixel sizes in overlay props are authored against this frame width.
pub const REFERENCE_WIDTH: f64 = 1920.0;

const DEFAULT_COLOR: Rgba = Rgba(0x3b, 0x82, 0xf6, 255);

/// Captures the overlay layer for one export frame.
pub trait OverlayLayer: Send {
    /// Render the overlays visible at `time` into a `width` x `height` frame.
    fn capture(&mut self, time: f64, width: u32, height: u32) -> ExportResult<Frame>;
}

/// Draws one overlay kind.
pub trait OverlayRenderer: Send + Sync {
    /// Draw `overlay` as it looks at project time `time`.
    fn render(&self, overlay: &TimelineComponent, time: f64, frame: &mut Frame)
        -> ExportResult<()>;
}

/// Renderers keyed by overlay kind.
pub struct OverlayRegistry {
    renderers: HashMap<String, Box<dyn OverlayRenderer>>,
}

impl Default for OverlayRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl OverlayRegistry {
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Registry with the built-in ripple and freeze-frame renderers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(&OverlayKind::RippleEffect, Box::new(RippleRenderer));
        registry.register(&OverlayKind::FreezeFrame, Box::new(FreezeFrameRenderer));
        registry
    }

    pub fn register(&mut self, kind: &OverlayKind, renderer: Box<dyn OverlayRenderer>) {
        self.renderers.insert(kind.as_str().to_string(), renderer);
    }

    pub fn get(&self, kind: &OverlayKind) -> Option<&dyn OverlayRenderer> {
        self.renderers.get(kind.as_str()).map(|r| r.as_ref())
    }
}

/// The timeline's overlays, rasterized on demand.
pub struct TimelineOverlayLayer {
    overlays: Vec<TimelineComponent>,
    registry: OverlayRegistry,
    unrendered: HashSet<String>,
}

impl TimelineOverlayLayer {
    pub fn new(overlays: Vec<TimelineComponent>, registry: OverlayRegistry) -> Self {
        Self {
            overlays,
            registry,
            unrendered: HashSet::new(),
        }
    }
}

impl OverlayLayer for TimelineOverlayLayer {
    fn capture(&mut self, time: f64, width: u32, height: u32) -> ExportResult<Frame> {
        let mut frame = Frame::new(width, height);
        let mut active: Vec<&TimelineComponent> = self
            .overlays
            .iter()
            .filter(|o| o.is_active_at(time))
            .collect();
        // Lower rows paint first so higher rows end up on top.
        active.sort_by_key(|o| o.row);

        for overlay in active {
            match self.registry.get(&overlay.kind) {
                Some(renderer) => renderer.render(overlay, time, &mut frame)?,
                None => {
                    if self.unrendered.insert(overlay.kind.as_str().to_string()) {
                        tracing::debug!(kind = %overlay.kind, "No renderer for overlay kind");
                    }
                }
            }
        }
        Ok(frame)
    }
}

fn color_prop(overlay: &TimelineComponent, key: &str) -> Rgba {
    overlay
        .props
        .get(key)
        .and_then(|v| v.as_str())
        .and_then(Rgba::from_hex)
        .unwrap_or(DEFAULT_COLOR)
}

fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Expanding click ripple: two rings and a centre dot.
pub struct RippleRenderer;

impl OverlayRenderer for RippleRenderer {
    fn render(
        &self,
        overlay: &TimelineComponent,
        time: f64,
        frame: &mut Frame,
    ) -> ExportResult<()> {
        let x = overlay.prop_f64("x").unwrap_or(50.0);
        let y = overlay.prop_f64("y").unwrap_or(50.0);
        let size = overlay.prop_f64("size").unwrap_or(50.0);
        let duration = overlay
            .prop_f64("duration")
            .filter(|d| *d > 0.0)
            .unwrap_or(0.6);
        let color = color_prop(overlay, "color");

        let scale = frame.width() as f64 / REFERENCE_WIDTH;
        let cx = x / 100.0 * frame.width() as f64;
        let cy = y / 100.0 * frame.height() as f64;
        let elapsed = time - overlay.start_time;

        let main = ease_out(elapsed / duration);
        if main < 1.0 {
            frame.stroke_circle(
                cx,
                cy,
                size * 1.25 * main * scale,
                (3.0 * scale).max(1.0),
                color.with_opacity(0.8 * (1.0 - main)),
            );
        }

        let secondary_elapsed = elapsed - 0.1;
        if secondary_elapsed > 0.0 {
            let p = ease_out(secondary_elapsed / (duration * 0.8));
            if p < 1.0 {
                frame.stroke_circle(
                    cx,
                    cy,
                    size * p * scale,
                    (1.5 * scale).max(1.0),
                    color.with_opacity(0.6 * (1.0 - p)),
                );
            }
        }

        let dot_fade = ((elapsed - duration * 0.5) / 0.3).clamp(0.0, 1.0);
        if dot_fade < 1.0 {
            let radius = (4.0 * scale).max(1.0) * (1.0 - dot_fade);
            frame.stroke_circle(cx, cy, radius, radius, color.with_opacity(1.0 - dot_fade));
        }
        Ok(())
    }
}

/// Dims the frame, leaving holes for the highlights active at `time`.
pub struct FreezeFrameRenderer;

impl OverlayRenderer for FreezeFrameRenderer {
    fn render(
        &self,
        overlay: &TimelineComponent,
        time: f64,
        frame: &mut Frame,
    ) -> ExportResult<()> {
        let dim = overlay.prop_f64("dimOpacity").unwrap_or(0.7).clamp(0.0, 1.0);
        let relative = time - overlay.start_time;
        let (w, h) = (frame.width() as f64, frame.height() as f64);

        let highlights = match overlay.props.get("highlights") {
            None => Vec::new(),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| Highlight::from_value(item, overlay.duration()))
                .filter(|hl| hl.is_active(relative))
                .collect(),
            Some(other) => {
                return Err(ExportError::OverlayCapture(format!(
                    "freeze-frame {} has malformed highlights: {other}",
                    overlay.id
                )))
            }
        };

        let shade = Rgba::BLACK.with_opacity(dim);
        for py in 0..frame.height() {
            for px in 0..frame.width() {
                let (fx, fy) = (px as f64 + 0.5, py as f64 + 0.5);
                if highlights.iter().any(|hl| hl.covers(fx / w, fy / h)) {
                    continue;
                }
                frame.blend_pixel(px as i64, py as i64, shade);
            }
        }
        Ok(())
    }
}

/// A highlight rectangle in percent of the frame, timed relative to its
/// freeze-frame.
#[derive(Debug, Clone, PartialEq)]
struct Highlight {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    start: f64,
    end: f64,
}

impl Highlight {
    fn from_value(value: &serde_json::Value, freeze_duration: f64) -> Option<Self> {
        let num = |key: &str| {
            value.get(key).and_then(|v| match v {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.parse().ok(),
                _ => None,
            })
        };
        let start = num("startTime").unwrap_or(0.0);
        let end = num("duration").map_or(freeze_duration, |d| start + d);
        Some(Self {
            x: num("x")? / 100.0,
            y: num("y")? / 100.0,
            width: num("width")? / 100.0,
            height: num("height")? / 100.0,
            start,
            end,
        })
    }

    fn is_active(&self, relative: f64) -> bool {
        relative >= self.start && relative < self.end
    }

    fn covers(&self, u: f64, v: f64) -> bool {
        u >= self.x && u < self.x + self.width && v >= self.y && v < self.y + self.height
    }
}
