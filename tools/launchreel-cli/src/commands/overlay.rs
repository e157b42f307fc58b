//! Overlay edits.

use std::path::PathBuf;

use anyhow::Context;
use launchreel_common::AppConfig;
use launchreel_project_model::{Props, TemplateRef};

use super::{edit_project, print_timeline};

fn parse_props(json: &str) -> anyhow::Result<Props> {
    serde_json::from_str(json).context("Props must be a JSON object")
}

pub fn add(
    config: &AppConfig,
    path: PathBuf,
    template: String,
    time: f64,
    props: Option<String>,
) -> anyhow::Result<()> {
    let props = props.as_deref().map(parse_props).transpose()?;
    edit_project(&path, config.editor, |timeline, project_dir| {
        let library = project_dir.library();
        let ids = timeline.add_overlay(&library, &TemplateRef::Id(template.clone()), time, props)?;
        println!("Added {} overlay(s) from '{template}': {}", ids.len(), ids.join(", "));
        print_timeline(timeline);
        Ok(())
    })
}

pub fn retime(
    config: &AppConfig,
    path: PathBuf,
    overlay: String,
    start: f64,
    end: f64,
) -> anyhow::Result<()> {
    edit_project(&path, config.editor, |timeline, _| {
        timeline.update_timing(&overlay, start, end)?;
        println!("Retimed {overlay}");
        print_timeline(timeline);
        Ok(())
    })
}

pub fn set_props(
    config: &AppConfig,
    path: PathBuf,
    overlay: String,
    props: String,
) -> anyhow::Result<()> {
    let partial = parse_props(&props)?;
    edit_project(&path, config.editor, |timeline, _| {
        timeline.update_props(&overlay, partial)?;
        println!("Updated props of {overlay}");
        print_timeline(timeline);
        Ok(())
    })
}
