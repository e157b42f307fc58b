//! Export configuration and the frame-by-frame export loop.
//!
//! The exporter drives the playback clock and the media source one frame at a
//! time: for every output frame it moves the clock, seeks the media to the
//! clip's source time, captures the overlay layer, composites both and hands
//! the result to a [`VideoEncoder`]. Whatever happens, the clock and media
//! end up where they were before the export began.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use launchreel_common::{ExportTuning, FrameRate};
use launchreel_playback::{FrameScheduler, PlaybackClock};
use launchreel_project_model::VideoClip;

use crate::compositor::{clip_sample_at, is_keyframe};
use crate::error::{ExportError, ExportResult};
use crate::frame::{Frame, Rgba};
use crate::overlay::OverlayLayer;

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Output file path.
    pub output_path: PathBuf,

    /// Requested output width; rounded down to even.
    pub width: u32,

    /// Requested output height; rounded down to even.
    pub height: u32,

    /// Length of the export, normally the source media duration.
    pub duration_secs: f64,

    /// Frame rate, keyframe cadence and timing knobs.
    pub tuning: ExportTuning,
}

impl ExportJob {
    /// Output size with both dimensions rounded down to even numbers.
    pub fn output_size(&self) -> ExportResult<(u32, u32)> {
        let (width, height) = (self.width & !1, self.height & !1);
        if width == 0 || height == 0 {
            return Err(ExportError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok((width, height))
    }

    pub fn frame_rate(&self) -> FrameRate {
        FrameRate::new(self.tuning.fps)
    }

    pub fn total_frames(&self) -> u64 {
        self.frame_rate().frame_count(self.duration_secs)
    }
}

/// Settings handed to the encoder before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub keyframe_interval: u64,
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Finalizing,
    Complete,
    Failed,
}

/// The decoded media the export reads pictures from.
#[async_trait]
pub trait ExportMedia: Send {
    /// Current media position in seconds.
    fn position(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// Move to `time`, resolving once the new position is decodable.
    async fn seek(&mut self, time: f64) -> ExportResult<()>;

    /// The picture at the current position, scaled to `width` x `height`.
    async fn grab_frame(&mut self, width: u32, height: u32) -> ExportResult<Frame>;

    async fn play(&mut self) -> ExportResult<()>;

    fn pause(&mut self);
}

/// Consumes composited frames in presentation order.
pub trait VideoEncoder: Send {
    fn configure(&mut self, config: &EncoderConfig) -> ExportResult<()>;

    fn encode(
        &mut self,
        frame: &Frame,
        timestamp_us: u64,
        duration_us: u64,
        keyframe: bool,
    ) -> ExportResult<()>;

    /// Push out any buffered frames.
    fn flush(&mut self) -> ExportResult<()>;

    /// Close the container and return the written file.
    fn finalize(&mut self) -> ExportResult<PathBuf>;
}

/// Everything the export borrows from the running editor.
pub struct ExportSession<'a, S: FrameScheduler> {
    pub clips: &'a [VideoClip],
    pub project_duration: f64,
    pub clock: &'a mut PlaybackClock<S>,
    pub media: &'a mut dyn ExportMedia,
    pub overlays: &'a mut dyn OverlayLayer,
    pub encoder: &'a mut dyn VideoEncoder,
}

/// What a finished export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub frames: u64,
    pub width: u32,
    pub height: u32,
    /// Frames exported without their overlay layer after a capture failure.
    pub overlay_failures: u64,
}

/// Export the timeline to a video file.
///
/// This is the main entry point for rendering. Overlay capture failures are
/// logged and the frame is exported without overlays; any other failure
/// aborts the export.
pub async fn export_project<S: FrameScheduler>(
    job: &ExportJob,
    session: ExportSession<'_, S>,
    progress: Option<ProgressCallback>,
) -> ExportResult<ExportSummary> {
    let ExportSession {
        clips,
        project_duration,
        clock,
        media,
        overlays,
        encoder,
    } = session;

    tracing::info!(
        output = %job.output_path.display(),
        width = job.width,
        height = job.height,
        duration_secs = job.duration_secs,
        fps = job.tuning.fps,
        "Starting export"
    );

    let (width, height) = job.output_size()?;
    if job.duration_secs <= 0.0 {
        return Err(ExportError::EmptyTimeline(job.duration_secs));
    }

    report(
        &progress,
        ExportProgress {
            progress: 0.0,
            frames_rendered: 0,
            total_frames: job.total_frames(),
            eta_secs: 0.0,
            stage: ExportStage::Preparing,
        },
    );

    let saved = SavedState {
        clock_time: clock.current_time(),
        clock_playing: clock.is_playing(),
        media_position: media.position(),
        media_playing: media.is_playing(),
    };
    clock.pause();
    media.pause();

    let result = render_frames(
        job,
        (width, height),
        clips,
        project_duration,
        clock,
        media,
        overlays,
        encoder,
        &progress,
    )
    .await;

    restore(job, &saved, project_duration, clock, media).await;

    match &result {
        Ok(summary) => {
            tracing::info!(
                output = %summary.output_path.display(),
                frames = summary.frames,
                overlay_failures = summary.overlay_failures,
                "Export complete"
            );
            report(
                &progress,
                ExportProgress {
                    progress: 1.0,
                    frames_rendered: summary.frames,
                    total_frames: summary.frames,
                    eta_secs: 0.0,
                    stage: ExportStage::Complete,
                },
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Export failed");
            report(
                &progress,
                ExportProgress {
                    progress: 0.0,
                    frames_rendered: 0,
                    total_frames: job.total_frames(),
                    eta_secs: 0.0,
                    stage: ExportStage::Failed,
                },
            );
        }
    }
    result
}

struct SavedState {
    clock_time: f64,
    clock_playing: bool,
    media_position: f64,
    media_playing: bool,
}

#[allow(clippy::too_many_arguments)]
async fn render_frames<S: FrameScheduler>(
    job: &ExportJob,
    (width, height): (u32, u32),
    clips: &[VideoClip],
    project_duration: f64,
    clock: &mut PlaybackClock<S>,
    media: &mut dyn ExportMedia,
    overlays: &mut dyn OverlayLayer,
    encoder: &mut dyn VideoEncoder,
    progress: &Option<ProgressCallback>,
) -> ExportResult<ExportSummary> {
    let tuning = &job.tuning;
    let rate = job.frame_rate();
    let total_frames = job.total_frames();
    let seek_timeout = Duration::from_millis(tuning.seek_timeout_ms);
    let settle = Duration::from_millis(tuning.settle_delay_ms);

    if let Some(parent) = job.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    encoder
        .configure(&EncoderConfig {
            output_path: job.output_path.clone(),
            width,
            height,
            fps: rate.fps(),
            keyframe_interval: tuning.keyframe_interval,
        })
        .map_err(|e| match e {
            ExportError::EncoderConfig(_) => e,
            other => ExportError::EncoderConfig(other.to_string()),
        })?;

    let start = Instant::now();
    let mut held: Option<Frame> = None;
    let mut overlay_failures = 0u64;

    for index in 0..total_frames {
        let time = rate.frame_time(index);
        let sample = clip_sample_at(clips, time);
        clock.set_current_time(time, project_duration);

        if let Some(sample) = &sample {
            match tokio::time::timeout(seek_timeout, media.seek(sample.source_time)).await {
                Ok(result) => result?,
                Err(_) => tracing::warn!(
                    frame = index,
                    target = sample.source_time,
                    timeout_ms = tuning.seek_timeout_ms,
                    "Seek did not complete in time; continuing"
                ),
            }
        }
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
        if sample.is_some() {
            held = Some(media.grab_frame(width, height).await?);
        }

        let mut frame = match &held {
            Some(picture) => picture.clone(),
            None => Frame::filled(width, height, Rgba::BLACK),
        };
        match overlays.capture(time, width, height) {
            Ok(layer) => frame.composite_over(&layer),
            Err(e) => {
                overlay_failures += 1;
                tracing::warn!(
                    frame = index,
                    time,
                    error = %e,
                    "Overlay capture failed; exporting frame without overlays"
                );
            }
        }

        encoder.encode(
            &frame,
            rate.frame_timestamp_us(index),
            rate.frame_duration_us(),
            is_keyframe(index, tuning.keyframe_interval),
        )?;

        let rendered = index + 1;
        if tuning.progress_interval > 0 && rendered % tuning.progress_interval == 0 {
            tracing::debug!(frames = rendered, total = total_frames, "Export progress");
            report(
                progress,
                progress_report(rendered, total_frames, start.elapsed().as_secs_f64()),
            );
        }
    }

    report(
        progress,
        ExportProgress {
            progress: 1.0,
            frames_rendered: total_frames,
            total_frames,
            eta_secs: 0.0,
            stage: ExportStage::Finalizing,
        },
    );
    encoder.flush()?;
    let output_path = encoder.finalize()?;

    Ok(ExportSummary {
        output_path,
        frames: total_frames,
        width,
        height,
        overlay_failures,
    })
}

async fn restore<S: FrameScheduler>(
    job: &ExportJob,
    saved: &SavedState,
    project_duration: f64,
    clock: &mut PlaybackClock<S>,
    media: &mut dyn ExportMedia,
) {
    let seek_timeout = Duration::from_millis(job.tuning.seek_timeout_ms);
    match tokio::time::timeout(seek_timeout, media.seek(saved.media_position)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "Failed to restore media position"),
        Err(_) => tracing::warn!("Timed out restoring media position"),
    }
    if saved.media_playing {
        if let Err(e) = media.play().await {
            tracing::warn!(error = %e, "Failed to resume media after export");
        }
    }

    clock.set_current_time(saved.clock_time, project_duration);
    if saved.clock_playing {
        clock.play(project_duration);
    }
}

fn report(progress: &Option<ProgressCallback>, update: ExportProgress) {
    if let Some(cb) = progress {
        cb(update);
    }
}

fn progress_report(frames_rendered: u64, total_frames: u64, elapsed_secs: f64) -> ExportProgress {
    let progress = if total_frames == 0 {
        0.0
    } else {
        (frames_rendered as f64 / total_frames as f64).clamp(0.0, 1.0)
    };
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress,
        frames_rendered,
        total_frames,
        eta_secs,
        stage: ExportStage::Rendering,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(width: u32, height: u32, duration_secs: f64) -> ExportJob {
        ExportJob {
            output_path: PathBuf::from("out.mp4"),
            width,
            height,
            duration_secs,
            tuning: ExportTuning::default(),
        }
    }

    #[test]
    fn test_output_size_rounds_down_to_even() {
        assert_eq!(job(1921, 1081, 1.0).output_size().unwrap(), (1920, 1080));
        assert_eq!(job(1280, 720, 1.0).output_size().unwrap(), (1280, 720));
        assert!(matches!(
            job(1, 720, 1.0).output_size(),
            Err(ExportError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_total_frames_rounds_up() {
        assert_eq!(job(2, 2, 2.0).total_frames(), 60);
        assert_eq!(job(2, 2, 0.01).total_frames(), 1);
        assert_eq!(job(2, 2, 0.0).total_frames(), 0);
    }

    #[test]
    fn test_progress_report_eta() {
        let report = progress_report(30, 60, 2.0);
        assert!((report.progress - 0.5).abs() < 1e-9);
        assert!((report.eta_secs - 2.0).abs() < 1e-9);
        assert_eq!(report.stage, ExportStage::Rendering);

        let empty = progress_report(0, 0, 1.0);
        assert_eq!(empty.progress, 0.0);
        assert_eq!(empty.eta_secs, 0.0);
    }
}
