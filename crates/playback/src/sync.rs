//! Media synchronizer.
//!
//! Called on every change of project time. The drift threshold is wider
//! while playing so natural decoder drift does not trigger a seek every
//! frame, and tight while paused so stepping through time lands on the
//! exact frame.

use launchreel_common::{DriftMeasurement, SyncTuning};
use launchreel_project_model::VideoClip;

use crate::error::MediaError;

/// A playable media element, such as a browser `<video>` or a decoder.
pub trait MediaElement {
    /// Current media position in seconds.
    fn current_time(&self) -> f64;
    fn is_paused(&self) -> bool;
    /// Whether a previously issued seek has not completed yet.
    fn is_seeking(&self) -> bool;
    fn seek(&mut self, time: f64);
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
}

/// What a sync pass did to the media position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncAction {
    /// Drift exceeded the threshold; a seek was issued.
    Seeked { target: f64 },
    /// A seek was still in flight; the new one waits until `due_at`.
    Deferred { target: f64, due_at: f64 },
    /// Within tolerance; position untouched.
    InSync,
    /// No clip covers the current time; media paused where it was.
    Gap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DeferredSeek {
    target: f64,
    due_at: f64,
}

/// Keeps one media element aligned with the playback clock.
#[derive(Debug, Clone)]
pub struct MediaSynchronizer {
    tuning: SyncTuning,
    deferred: Option<DeferredSeek>,
}

impl MediaSynchronizer {
    pub fn new(tuning: SyncTuning) -> Self {
        Self {
            tuning,
            deferred: None,
        }
    }

    /// Seek waiting to be issued, if any.
    pub fn deferred_target(&self) -> Option<f64> {
        self.deferred.map(|d| d.target)
    }

    /// Drift allowed in the given play state.
    pub fn threshold(&self, playing: bool) -> f64 {
        if playing {
            self.tuning.playing_drift_threshold
        } else {
            self.tuning.paused_drift_threshold
        }
    }

    /// Reconcile `media` with project time `current_time`. `now_secs` is
    /// wall-clock time used to schedule deferred seeks.
    pub fn sync<M: MediaElement + ?Sized>(
        &mut self,
        media: &mut M,
        clips: &[VideoClip],
        current_time: f64,
        playing: bool,
        now_secs: f64,
    ) -> SyncAction {
        let Some(clip) = clips.iter().find(|c| c.contains(current_time)) else {
            self.deferred = None;
            if !media.is_paused() {
                media.pause();
            }
            return SyncAction::Gap;
        };

        let drift = DriftMeasurement {
            target_secs: clip.source_time_at(current_time),
            actual_secs: media.current_time(),
        };
        let action = if !drift.exceeds(self.threshold(playing)) {
            self.deferred = None;
            SyncAction::InSync
        } else if !playing && media.is_seeking() {
            let deferred = DeferredSeek {
                target: drift.target_secs,
                due_at: now_secs + self.tuning.seek_defer,
            };
            self.deferred = Some(deferred);
            tracing::debug!(target = deferred.target, "Seek in flight; deferring");
            SyncAction::Deferred {
                target: deferred.target,
                due_at: deferred.due_at,
            }
        } else {
            tracing::debug!(
                clip = %clip.id,
                target = drift.target_secs,
                drift_ms = drift.drift_ms(),
                "Correcting media drift"
            );
            self.deferred = None;
            media.seek(drift.target_secs);
            SyncAction::Seeked {
                target: drift.target_secs,
            }
        };

        self.sync_play_state(media, playing);
        action
    }

    /// Issue a deferred seek once it is due. Returns the target when a seek
    /// was issued.
    pub fn poll_deferred<M: MediaElement + ?Sized>(
        &mut self,
        media: &mut M,
        now_secs: f64,
    ) -> Option<f64> {
        let deferred = self.deferred?;
        if now_secs < deferred.due_at {
            return None;
        }
        if media.is_seeking() {
            self.deferred = Some(DeferredSeek {
                due_at: now_secs + self.tuning.seek_defer,
                ..deferred
            });
            return None;
        }
        self.deferred = None;
        media.seek(deferred.target);
        Some(deferred.target)
    }

    fn sync_play_state<M: MediaElement + ?Sized>(&self, media: &mut M, playing: bool) {
        if playing && media.is_paused() {
            if let Err(e) = media.play() {
                // Autoplay refusals are expected; the next user gesture retries.
                tracing::debug!(error = %e, "Media play request rejected");
            }
        } else if !playing && !media.is_paused() {
            media.pause();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Scripted media element.
    #[derive(Debug, Default)]
    pub(crate) struct FakeMedia {
        pub position: f64,
        pub paused: bool,
        pub seeking: bool,
        pub reject_play: bool,
        pub seeks: Vec<f64>,
    }

    impl MediaElement for FakeMedia {
        fn current_time(&self) -> f64 {
            self.position
        }
        fn is_paused(&self) -> bool {
            self.paused
        }
        fn is_seeking(&self) -> bool {
            self.seeking
        }
        fn seek(&mut self, time: f64) {
            self.position = time;
            self.seeks.push(time);
        }
        fn play(&mut self) -> Result<(), MediaError> {
            if self.reject_play {
                return Err(MediaError::PlayRejected("autoplay denied".to_string()));
            }
            self.paused = false;
            Ok(())
        }
        fn pause(&mut self) {
            self.paused = true;
        }
    }

    pub(crate) fn clip(start: f64, end: f64, source_start: f64) -> VideoClip {
        VideoClip {
            id: "c1".to_string(),
            start,
            end,
            source_start,
            source_end: source_start + (end - start),
            name: "screen".to_string(),
            row: 0,
            media_duration: None,
            events: vec![],
        }
    }

    fn sync() -> MediaSynchronizer {
        MediaSynchronizer::new(SyncTuning::default())
    }

    #[test]
    fn test_seeks_when_paused_drift_is_small_but_over_threshold() {
        let clips = [clip(2.0, 5.0, 0.0)];
        let mut media = FakeMedia {
            position: 1.0,
            paused: true,
            ..Default::default()
        };
        let action = sync().sync(&mut media, &clips, 3.1, false, 0.0);
        assert!(matches!(action, SyncAction::Seeked { target } if (target - 1.1).abs() < 1e-9));
        assert_eq!(media.seeks.len(), 1);
    }

    #[test]
    fn test_playing_tolerates_more_drift() {
        let clips = [clip(2.0, 5.0, 0.0)];
        let mut media = FakeMedia {
            position: 1.0,
            paused: false,
            ..Default::default()
        };
        let action = sync().sync(&mut media, &clips, 3.2, true, 0.0);
        assert_eq!(action, SyncAction::InSync);
        assert!(media.seeks.is_empty());
    }

    #[test]
    fn test_gap_pauses_without_moving() {
        let clips = [clip(0.0, 5.0, 0.0), clip(7.0, 12.0, 5.0)];
        let mut media = FakeMedia {
            position: 4.9,
            paused: false,
            ..Default::default()
        };
        let action = sync().sync(&mut media, &clips, 6.0, true, 0.0);
        assert_eq!(action, SyncAction::Gap);
        assert!(media.paused);
        assert_eq!(media.position, 4.9);
    }

    #[test]
    fn test_end_of_clip_belongs_to_next() {
        let clips = [clip(0.0, 5.0, 0.0), clip(5.0, 8.0, 20.0)];
        let mut media = FakeMedia {
            position: 5.0,
            paused: true,
            ..Default::default()
        };
        let action = sync().sync(&mut media, &clips, 5.0, false, 0.0);
        assert_eq!(action, SyncAction::Seeked { target: 20.0 });
    }

    #[test]
    fn test_paused_seek_in_flight_is_deferred() {
        let clips = [clip(0.0, 10.0, 0.0)];
        let mut media = FakeMedia {
            position: 1.0,
            paused: true,
            seeking: true,
            ..Default::default()
        };
        let mut sync = sync();
        let action = sync.sync(&mut media, &clips, 4.0, false, 100.0);
        assert!(matches!(action, SyncAction::Deferred { target, .. } if target == 4.0));
        assert!(media.seeks.is_empty());

        assert_eq!(sync.poll_deferred(&mut media, 100.01), None);
        media.seeking = false;
        assert_eq!(sync.poll_deferred(&mut media, 100.06), Some(4.0));
        assert_eq!(media.position, 4.0);
        assert_eq!(sync.deferred_target(), None);
    }

    #[test]
    fn test_play_rejection_is_swallowed() {
        let clips = [clip(0.0, 10.0, 0.0)];
        let mut media = FakeMedia {
            position: 1.0,
            paused: true,
            reject_play: true,
            ..Default::default()
        };
        let action = sync().sync(&mut media, &clips, 1.0, true, 0.0);
        assert_eq!(action, SyncAction::InSync);
        assert!(media.paused);
    }

    #[test]
    fn test_paused_clock_pauses_media() {
        let clips = [clip(0.0, 10.0, 0.0)];
        let mut media = FakeMedia {
            position: 1.0,
            paused: false,
            ..Default::default()
        };
        sync().sync(&mut media, &clips, 1.0, false, 0.0);
        assert!(media.paused);
    }
}
