//! Initialize a new LaunchReel project from a recording.

use std::path::PathBuf;

use anyhow::Context;
use launchreel_common::AppConfig;
use launchreel_editor_core::Timeline;
use launchreel_persistence::refs::mime_for_path;
use launchreel_persistence::FileRefs;
use launchreel_project_model::{parse_events, MediaInfo};
use launchreel_render_engine::{probe_media, ProbedMedia};

use super::{print_timeline, ProjectDir};

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    media: PathBuf,
    events: Option<PathBuf>,
    duration: Option<f64>,
    width: Option<u32>,
    height: Option<u32>,
) -> anyhow::Result<()> {
    let media = media
        .canonicalize()
        .with_context(|| format!("Media file not found: {}", media.display()))?;
    println!("Creating project at {} from {}", path.display(), media.display());

    let probed = match (duration, width, height) {
        (Some(duration_secs), Some(width), Some(height)) => ProbedMedia {
            width,
            height,
            duration_secs,
        },
        _ => probe_media(&media).ok_or_else(|| {
            anyhow::anyhow!(
                "Could not probe {} (is ffprobe installed?). Pass --duration, --width and --height.",
                media.display()
            )
        })?,
    };

    let events = match events {
        Some(events_path) => {
            let content = std::fs::read_to_string(&events_path)
                .with_context(|| format!("Failed to read {}", events_path.display()))?;
            parse_events(&content)
                .with_context(|| format!("Invalid events file {}", events_path.display()))?
        }
        None => Vec::new(),
    };

    let info = MediaInfo {
        name: media
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Recording".to_string()),
        mime: mime_for_path(&media).to_string(),
        duration: probed.duration_secs,
        width: probed.width,
        height: probed.height,
        events,
    };

    let timeline = Timeline::from_media(&info, config.editor)?;
    let project_dir = ProjectDir::open(&path)?;
    project_dir.save(&timeline, Some(FileRefs::reference_for(&media)))?;

    println!("Project created successfully:");
    println!("  Directory: {}", project_dir.root().display());
    println!("  Media: {} ({}x{}, {})", info.name, info.width, info.height, info.mime);
    println!("  Interaction events: {}", info.events.len());
    println!();
    print_timeline(&timeline);

    Ok(())
}
