//! Playback clock.
//!
//! The clock owns `current_time`. While playing, the host calls [`PlaybackClock::tick`]
//! from its per-frame callback with a wall-clock timestamp; the clock keeps at
//! most one outstanding frame request so starting playback twice never runs
//! two tick chains.

use launchreel_common::{ManualClock, WallClock};

/// Handle for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Host facility that calls back once per display frame.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Play state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Paused,
    Playing,
}

/// Single authoritative project time.
#[derive(Debug)]
pub struct PlaybackClock<S: FrameScheduler> {
    scheduler: S,
    state: PlaybackState,
    current_time: f64,
    pending: Option<FrameRequest>,
    last_tick_secs: Option<f64>,
}

impl<S: FrameScheduler> PlaybackClock<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: PlaybackState::Paused,
            current_time: 0.0,
            pending: None,
            last_tick_secs: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Start playing. A no-op while already playing. Playing from the very
    /// end of the timeline starts over from zero.
    pub fn play(&mut self, project_duration: f64) {
        self.start(project_duration, None);
    }

    /// [`play`](Self::play) at wall-clock `now_secs`. The first tick then
    /// advances by the time elapsed since this call.
    pub fn play_at(&mut self, project_duration: f64, now_secs: f64) {
        self.start(project_duration, Some(now_secs));
    }

    fn start(&mut self, project_duration: f64, now_secs: Option<f64>) {
        if self.is_playing() {
            return;
        }
        if self.current_time >= project_duration {
            self.current_time = 0.0;
        }
        self.state = PlaybackState::Playing;
        self.last_tick_secs = now_secs;
        self.pending = Some(self.scheduler.request_frame());
        tracing::debug!(from = self.current_time, "Playback started");
    }

    /// Stop playing and cancel the outstanding frame request.
    pub fn pause(&mut self) {
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
        if self.is_playing() {
            self.state = PlaybackState::Paused;
            tracing::debug!(at = self.current_time, "Playback paused");
        }
        self.last_tick_secs = None;
    }

    pub fn toggle(&mut self, project_duration: f64) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.play(project_duration),
        }
    }

    /// Frame callback for `request` at wall-clock `now_secs`. Stale or
    /// cancelled requests are ignored. Returns the new current time.
    pub fn tick(&mut self, request: FrameRequest, now_secs: f64, project_duration: f64) -> f64 {
        if self.pending != Some(request) || !self.is_playing() {
            return self.current_time;
        }
        self.pending = None;

        let delta = self
            .last_tick_secs
            .map_or(0.0, |last| (now_secs - last).max(0.0));
        self.last_tick_secs = Some(now_secs);
        self.advance(delta, project_duration);

        if self.is_playing() {
            self.pending = Some(self.scheduler.request_frame());
        }
        self.current_time
    }

    /// [`tick`](Self::tick) reading "now" from a wall clock.
    pub fn tick_with<C: WallClock>(
        &mut self,
        request: FrameRequest,
        wall: &C,
        project_duration: f64,
    ) -> f64 {
        self.tick(request, wall.now_secs(), project_duration)
    }

    /// Move time forward by `delta` seconds, stopping exactly at the end.
    pub fn advance(&mut self, delta: f64, project_duration: f64) {
        let next = self.current_time + delta;
        if next >= project_duration {
            self.current_time = project_duration;
            self.pause();
            tracing::debug!(duration = project_duration, "Reached end of timeline");
        } else {
            self.current_time = next;
        }
    }

    /// Seek. Legal in either state; does not change play state.
    pub fn set_current_time(&mut self, time: f64, project_duration: f64) {
        self.current_time = time.clamp(0.0, project_duration.max(0.0));
    }
}

/// Scheduler driven by hand: tests and offline tools fire frames explicitly.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    outstanding: Vec<FrameRequest>,
}

impl ManualScheduler {
    /// Requests that have been made and not yet fired or cancelled.
    pub fn outstanding(&self) -> &[FrameRequest] {
        &self.outstanding
    }

    /// Take the oldest outstanding request, as the host would when a frame
    /// is presented.
    pub fn fire(&mut self) -> Option<FrameRequest> {
        if self.outstanding.is_empty() {
            None
        } else {
            Some(self.outstanding.remove(0))
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.outstanding.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.outstanding.retain(|r| *r != request);
    }
}

/// Run a clock on a [`ManualScheduler`] for `frames` frames spaced
/// `frame_secs` apart, starting at wall time `start_secs`.
pub fn run_frames(
    clock: &mut PlaybackClock<ManualScheduler>,
    frames: usize,
    start_secs: f64,
    frame_secs: f64,
    project_duration: f64,
) {
    let wall = ManualClock::new(start_secs);
    for _ in 0..frames {
        let Some(request) = clock.scheduler.fire() else {
            break;
        };
        clock.tick_with(request, &wall, project_duration);
        wall.advance(frame_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_clamps_at_end_and_pauses() {
        let mut clock = PlaybackClock::new(ManualScheduler::default());
        clock.play(10.0);
        // First tick establishes the wall-clock baseline.
        run_frames(&mut clock, 50, 100.0, 0.25, 10.0);
        assert_eq!(clock.current_time(), 10.0);
        assert_eq!(clock.state(), PlaybackState::Paused);
        assert!(clock.scheduler().outstanding().is_empty());
    }

    #[test]
    fn test_play_is_idempotent() {
        let mut clock = PlaybackClock::new(ManualScheduler::default());
        clock.play(10.0);
        clock.play(10.0);
        assert_eq!(clock.scheduler().outstanding().len(), 1);
    }

    #[test]
    fn test_pause_cancels_chain() {
        let mut clock = PlaybackClock::new(ManualScheduler::default());
        clock.play(10.0);
        let request = clock.scheduler().outstanding()[0];
        clock.pause();
        assert!(clock.scheduler().outstanding().is_empty());
        // A late callback for the cancelled request does nothing.
        assert_eq!(clock.tick(request, 5.0, 10.0), 0.0);
    }

    #[test]
    fn test_ticks_accumulate_wall_clock_delta() {
        let mut clock = PlaybackClock::new(ManualScheduler::default());
        clock.set_current_time(2.0, 10.0);
        clock.play(10.0);
        run_frames(&mut clock, 4, 50.0, 0.5, 10.0);
        assert!((clock.current_time() - 3.5).abs() < 1e-9);
        assert!(clock.is_playing());
    }

    #[test]
    fn test_play_at_counts_time_before_first_frame() {
        let mut clock = PlaybackClock::new(ManualScheduler::default());
        clock.play_at(10.0, 20.0);
        let request = clock.scheduler.fire().unwrap();
        assert!((clock.tick(request, 20.5, 10.0) - 0.5).abs() < 1e-9);
        assert!(clock.is_playing());
    }

    #[test]
    fn test_seek_keeps_state_and_clamps() {
        let mut clock = PlaybackClock::new(ManualScheduler::default());
        clock.play(10.0);
        clock.set_current_time(25.0, 10.0);
        assert_eq!(clock.current_time(), 10.0);
        assert!(clock.is_playing());
        clock.set_current_time(-1.0, 10.0);
        assert_eq!(clock.current_time(), 0.0);
    }

    #[test]
    fn test_play_from_end_restarts() {
        let mut clock = PlaybackClock::new(ManualScheduler::default());
        clock.set_current_time(10.0, 10.0);
        clock.play(10.0);
        assert_eq!(clock.current_time(), 0.0);
    }

    #[test]
    fn test_advance_sums_past_end() {
        let mut clock = PlaybackClock::new(ManualScheduler::default());
        clock.play(10.0);
        for _ in 0..7 {
            clock.advance(1.6, 10.0);
        }
        assert_eq!(clock.current_time(), 10.0);
        assert!(!clock.is_playing());
    }
}
