//! Clock and timing utilities.
//!
//! Playback advances from wall-clock deltas, the media synchronizer measures
//! drift between project time and the media element, and the exporter needs
//! integer frame timestamps. All three share the helpers in this module.

use std::cell::Cell;
use std::time::Instant;

/// Source of monotonic "now" values in seconds.
pub trait WallClock {
    /// Seconds elapsed since an arbitrary fixed epoch.
    fn now_secs(&self) -> f64;
}

/// A monotonic clock anchored to the moment it was created.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

impl WallClock for MonotonicClock {
    fn now_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// A hand-driven clock for deterministic tests and headless stepping.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_secs: f64) -> Self {
        Self {
            now: Cell::new(start_secs),
        }
    }

    /// Move the clock forward by `secs`.
    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }

    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }
}

impl WallClock for ManualClock {
    fn now_secs(&self) -> f64 {
        self.now.get()
    }
}

/// Wall-clock milliseconds since the Unix epoch, used to stamp saved projects.
pub fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Drift between where the media should be and where it is.
#[derive(Debug, Clone, Copy)]
pub struct DriftMeasurement {
    /// Desired media position (seconds).
    pub target_secs: f64,
    /// Actual media position (seconds).
    pub actual_secs: f64,
}

impl DriftMeasurement {
    /// Drift in seconds (positive = media is ahead).
    pub fn drift_secs(&self) -> f64 {
        self.actual_secs - self.target_secs
    }

    /// Drift in milliseconds.
    pub fn drift_ms(&self) -> f64 {
        self.drift_secs() * 1000.0
    }

    /// Whether drift exceeds an acceptable threshold.
    pub fn exceeds(&self, threshold_secs: f64) -> bool {
        self.drift_secs().abs() > threshold_secs
    }
}

/// Fixed output frame rate with integer microsecond timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    fps: u32,
}

impl FrameRate {
    /// Create a frame rate; zero is treated as one frame per second.
    pub fn new(fps: u32) -> Self {
        Self { fps: fps.max(1) }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Number of frames needed to cover `duration_secs`.
    pub fn frame_count(&self, duration_secs: f64) -> u64 {
        if duration_secs <= 0.0 {
            return 0;
        }
        (duration_secs * self.fps as f64).ceil() as u64
    }

    /// Project time of frame `index`.
    pub fn frame_time(&self, index: u64) -> f64 {
        index as f64 / self.fps as f64
    }

    /// Frame duration in microseconds, truncated.
    pub fn frame_duration_us(&self) -> u64 {
        1_000_000 / self.fps as u64
    }

    /// Presentation timestamp of frame `index` in microseconds.
    pub fn frame_timestamp_us(&self, index: u64) -> u64 {
        index * self.frame_duration_us()
    }
}
