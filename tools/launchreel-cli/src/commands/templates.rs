//! Manage the overlay template library.

use std::path::PathBuf;

use anyhow::Context;
use launchreel_project_model::TemplateLibrary;

use super::ProjectDir;
use crate::TemplateAction;

pub fn run(path: PathBuf, action: TemplateAction) -> anyhow::Result<()> {
    let project_dir = ProjectDir::open(&path)?;
    let mut library = project_dir.library();

    match action {
        TemplateAction::List => {
            println!("Built-in templates:");
            for template in library.builtins() {
                println!("  {:<20} {}", template.id, template.name);
            }
            println!("Custom templates:");
            if library.custom().is_empty() {
                println!("  (none)");
            }
            for template in library.custom() {
                println!("  {:<20} {}", template.id, template.name);
            }
        }
        TemplateAction::Create {
            name,
            description,
            html,
            css,
        } => {
            let template = library.create_custom(
                name.as_deref(),
                description.as_deref(),
                html.as_deref(),
                css.as_deref(),
            );
            project_dir.save_library(&library)?;
            println!("Created template {} ({})", template.id, template.name);
        }
        TemplateAction::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let template = library.import_json(&content)?;
            project_dir.save_library(&library)?;
            println!("Imported template {} ({})", template.id, template.name);
        }
        TemplateAction::Export { id, file } => {
            let template = library
                .find(&id)
                .ok_or_else(|| anyhow::anyhow!("Template not found: {id}"))?;
            std::fs::write(&file, TemplateLibrary::export_json(template)?)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("Exported {id} to {}", file.display());
        }
        TemplateAction::Delete { id } => {
            if !library.remove_custom(&id) {
                anyhow::bail!("No custom template with id {id}");
            }
            project_dir.save_library(&library)?;
            println!("Deleted template {id}");
        }
    }

    Ok(())
}
