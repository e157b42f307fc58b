//! Export a project to video.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use launchreel_common::{AppConfig, FrameRate};
use launchreel_playback::{ManualScheduler, PlaybackClock};
use launchreel_render_engine::{
    compute_compositions, export_project, ffmpeg, ffmpeg_available, ExportJob, ExportProgress,
    ExportSession, FfmpegEncoder, FfmpegMediaSource, OverlayRegistry, TimelineOverlayLayer,
};

use super::ProjectDir;

const DEFAULT_SIZE: (u32, u32) = (1920, 1080);

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    fps: Option<u32>,
    plan: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("Exporting project at: {}", path.display());

    let project_dir = ProjectDir::open(&path)?;
    let project = project_dir.load(config.editor)?;
    let media_path = project
        .media_path()
        .ok_or_else(|| anyhow::anyhow!("Project has no main media to export"))?;

    if !ffmpeg_available() {
        anyhow::bail!("ffmpeg and ffprobe are required for export (expected in PATH)");
    }

    let output_path = with_mp4_extension(
        output.unwrap_or_else(|| path.join("exports").join("launchreel-export")),
    );
    let (source_width, source_height) = ffmpeg::probe_video_dimensions(&media_path)
        .unwrap_or_else(|| {
            tracing::warn!(path = %media_path.display(), "Could not probe media size, using 1920x1080");
            DEFAULT_SIZE
        });
    let mut tuning = config.export;
    if let Some(fps) = fps {
        tuning.fps = fps;
    }

    let mut media = FfmpegMediaSource::open(&media_path)?;
    let job = ExportJob {
        output_path: output_path.clone(),
        width: width.unwrap_or(source_width),
        height: height.unwrap_or(source_height),
        duration_secs: media.duration_secs(),
        tuning,
    };

    println!("  Output: {}", output_path.display());
    println!("  Resolution: {}x{} @ {}fps", job.width, job.height, tuning.fps);
    println!("  Frames: {}", job.total_frames());

    let timeline = &project.timeline;
    if let Some(plan_path) = plan {
        let compositions = compute_compositions(
            timeline.clips(),
            timeline.overlays(),
            FrameRate::new(tuning.fps),
            tuning.keyframe_interval,
            job.duration_secs,
        );
        let json = serde_json::to_string_pretty(&compositions)?;
        std::fs::write(&plan_path, json)
            .with_context(|| format!("Failed to write {}", plan_path.display()))?;
        println!("  Plan: {}", plan_path.display());
    }

    let mut clock = PlaybackClock::new(ManualScheduler::default());
    let mut overlays =
        TimelineOverlayLayer::new(timeline.overlays().to_vec(), OverlayRegistry::with_builtins());
    let mut encoder = FfmpegEncoder::new();

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.eta_secs,
        );
        let _ = std::io::stdout().flush();
    });

    let summary = export_project(
        &job,
        ExportSession {
            clips: timeline.clips(),
            project_duration: timeline.project_duration(),
            clock: &mut clock,
            media: &mut media,
            overlays: &mut overlays,
            encoder: &mut encoder,
        },
        Some(progress_cb),
    )
    .await;

    match summary {
        Ok(summary) => {
            println!("\nExport complete: {}", summary.output_path.display());
            if summary.overlay_failures > 0 {
                println!(
                    "  {} frame(s) were exported without overlays; see the log for details.",
                    summary.overlay_failures
                );
            }
            Ok(())
        }
        Err(e) => {
            println!();
            Err(e).context("Export failed")
        }
    }
}

/// Append `.mp4` unless the name already ends with it.
fn with_mp4_extension(path: PathBuf) -> PathBuf {
    let is_mp4 = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp4"));
    if is_mp4 {
        return path;
    }
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".mp4");
    match path.parent() {
        Some(parent) => parent.join(name),
        None => Path::new(&name).to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp4_extension_appended_when_missing() {
        assert_eq!(with_mp4_extension("demo".into()), PathBuf::from("demo.mp4"));
        assert_eq!(
            with_mp4_extension("out/demo.v2".into()),
            PathBuf::from("out/demo.v2.mp4")
        );
        assert_eq!(
            with_mp4_extension("out/demo.MP4".into()),
            PathBuf::from("out/demo.MP4")
        );
    }
}
