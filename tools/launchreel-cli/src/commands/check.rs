//! Check system capabilities.

use launchreel_common::AppConfig;
use launchreel_render_engine::command_exists;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("LaunchReel System Check");
    println!("{}", "=".repeat(50));

    let mut all_required_ok = true;
    for binary in ["ffmpeg", "ffprobe"] {
        if command_exists(binary) {
            println!("[OK] {binary} found in PATH");
        } else {
            all_required_ok = false;
            println!("[MISSING] {binary} not found in PATH (needed for probing and export)");
        }
    }

    println!();
    println!("Configuration:");
    println!("  Projects directory: {}", config.projects_dir.display());
    println!(
        "  Export: {}fps, keyframe every {} frames, seek timeout {}ms",
        config.export.fps, config.export.keyframe_interval, config.export.seek_timeout_ms
    );
    println!(
        "  Sync thresholds: {:.0}ms playing, {:.0}ms paused",
        config.sync.playing_drift_threshold * 1000.0,
        config.sync.paused_drift_threshold * 1000.0
    );
    println!(
        "  Auto-save debounce: {}ms",
        config.persistence.autosave_debounce_ms
    );

    println!();
    if all_required_ok {
        println!("All required tools are available. LaunchReel is ready.");
    } else {
        println!("Some required tools are missing. Install ffmpeg to enable export.");
    }

    Ok(())
}
