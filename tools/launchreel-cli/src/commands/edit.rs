//! Clip edits and keyboard-equivalent commands.

use std::collections::BTreeSet;
use std::path::PathBuf;

use launchreel_common::AppConfig;
use launchreel_editor_core::{CommandOutcome, EditCommand, ResizeEdge, Timeline};

use super::{edit_project, print_timeline};

pub fn split(config: &AppConfig, path: PathBuf, time: f64) -> anyhow::Result<()> {
    edit_project(&path, config.editor, |timeline, _| {
        if let CommandOutcome::Split { left, right } =
            timeline.apply_command(EditCommand::Split, time)?
        {
            println!("Split at {time:.2}s into {left} and {right}");
        }
        print_timeline(timeline);
        Ok(())
    })
}

pub fn move_clip(config: &AppConfig, path: PathBuf, clip: String, start: f64) -> anyhow::Result<()> {
    edit_project(&path, config.editor, |timeline, _| {
        timeline.move_clip(&clip, start)?;
        println!("Moved {clip}");
        print_timeline(timeline);
        Ok(())
    })
}

pub fn resize(
    config: &AppConfig,
    path: PathBuf,
    clip: String,
    edge: ResizeEdge,
    time: f64,
) -> anyhow::Result<()> {
    edit_project(&path, config.editor, |timeline, _| {
        timeline.resize_clip(&clip, edge, time)?;
        println!("Resized {clip} ({edge:?} edge)");
        print_timeline(timeline);
        Ok(())
    })
}

pub fn delete(config: &AppConfig, path: PathBuf, ids: Vec<String>) -> anyhow::Result<()> {
    edit_project(&path, config.editor, |timeline, _| {
        select(timeline, &ids)?;
        if let CommandOutcome::Deleted(count) = timeline.apply_command(EditCommand::Delete, 0.0)? {
            println!("Deleted {count} item(s)");
        }
        print_timeline(timeline);
        Ok(())
    })
}

pub fn duplicate(
    config: &AppConfig,
    path: PathBuf,
    ids: Vec<String>,
    time: f64,
) -> anyhow::Result<()> {
    edit_project(&path, config.editor, |timeline, _| {
        select(timeline, &ids)?;
        timeline.apply_command(EditCommand::Copy, time)?;
        if let CommandOutcome::Pasted(new_ids) = timeline.apply_command(EditCommand::Paste, time)? {
            println!("Pasted {} at {time:.2}s: {}", new_ids.len(), new_ids.join(", "));
        }
        print_timeline(timeline);
        Ok(())
    })
}

/// Select `ids`, which must all be clips or all be overlays.
fn select(timeline: &mut Timeline, ids: &[String]) -> anyhow::Result<()> {
    // Selecting twice would toggle an id back off.
    let ids: BTreeSet<&String> = ids.iter().collect();
    let all_clips = ids.iter().all(|id| timeline.clip(id).is_some());
    let all_overlays = ids.iter().all(|id| timeline.overlay(id).is_some());
    timeline.clear_selection();
    if all_clips {
        for id in &ids {
            timeline.select_clip(id, true)?;
        }
    } else if all_overlays {
        for id in &ids {
            timeline.select_overlay(id, true)?;
        }
    } else {
        let unknown: Vec<&str> = ids
            .iter()
            .filter(|id| timeline.clip(id).is_none() && timeline.overlay(id).is_none())
            .map(|id| id.as_str())
            .collect();
        if unknown.is_empty() {
            anyhow::bail!("Select either clips or overlays, not both");
        }
        anyhow::bail!("Unknown id(s): {}", unknown.join(", "));
    }
    Ok(())
}
