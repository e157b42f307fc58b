//! Validate a saved LaunchReel project.

use std::path::PathBuf;

use launchreel_persistence::BlobStore;

use super::ProjectDir;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project_dir = ProjectDir::open(&path)?;
    let document = project_dir
        .document()?
        .ok_or_else(|| anyhow::anyhow!("No project saved at {}", path.display()))?;

    println!("  Version: {}", document.version);
    println!("  Duration: {:.2}s", document.project_duration);
    println!("  Clips: {}", document.video_clips.len());
    println!("  Overlays: {}", document.timeline_components.len());

    let mut errors = document.validate();

    let mut asset_ids: Vec<&str> = document
        .timeline_components
        .iter()
        .flat_map(|c| c.assets.values().map(String::as_str))
        .collect();
    match document.main_video_asset_id.as_deref() {
        Some(id) => asset_ids.push(id),
        None => errors.push("no main media stored".to_string()),
    }
    for id in asset_ids {
        if BlobStore::get(project_dir.store(), id)?.is_none() {
            errors.push(format!("asset {id} is missing from the blob store"));
        }
    }

    if errors.is_empty() {
        println!("  Assets: All present");
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Project may not be fully usable.",
            errors.len()
        );
    }

    Ok(())
}
