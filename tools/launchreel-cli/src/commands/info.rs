//! Show project information.

use std::path::PathBuf;

use launchreel_common::AppConfig;

use super::{print_timeline, ProjectDir};

pub fn run(config: &AppConfig, path: PathBuf, at: Option<f64>) -> anyhow::Result<()> {
    let project_dir = ProjectDir::open(&path)?;
    let project = project_dir.load(config.editor)?;
    let timeline = &project.timeline;

    println!("Project: {}", project_dir.root().display());
    let saved = chrono::DateTime::from_timestamp_millis(project.saved_at)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| project.saved_at.to_string());
    println!("  Saved: {saved}");
    match project.media_path() {
        Some(media) => println!("  Media: {}", media.display()),
        None => println!("  Media: (missing)"),
    }
    println!(
        "  Zoom: {:.0}x (visible {:.2}s)",
        timeline.zoom(),
        timeline.visible_duration()
    );
    println!();
    print_timeline(timeline);

    if let Some(time) = at {
        println!();
        println!("At {time:.2}s:");
        match timeline.active_clip_at(time) {
            Some(clip) => println!(
                "  Clip: {} (source {:.2}s)",
                clip.id,
                clip.source_time_at(time)
            ),
            None => println!("  Clip: none (frozen frame)"),
        }
        for overlay in timeline.active_overlays_at(time) {
            println!(
                "  Overlay: {} {} ({:.0}%)",
                overlay.id,
                overlay.kind,
                overlay.progress_at(time) * 100.0
            );
        }
    }

    Ok(())
}
