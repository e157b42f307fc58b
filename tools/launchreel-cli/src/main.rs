//! LaunchReel CLI: command-line interface for editing and exporting projects.
//!
//! Usage:
//!   launchreel init <PATH> <MEDIA>       Create a project from a recording
//!   launchreel info <PATH>               Show project information
//!   launchreel validate <PATH>           Validate the saved project
//!   launchreel split <PATH> <TIME>       Split the clip under the playhead
//!   launchreel add-overlay <PATH> ...    Add an overlay from the library
//!   launchreel templates <PATH> ...      Manage custom templates
//!   launchreel export <PATH>             Export the project to video
//!   launchreel check                     Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use launchreel_common::logging::init_logging;
use launchreel_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "launchreel",
    about = "Timeline editing and export for product demo videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Edge {
    Left,
    Right,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project from a screen recording
    Init {
        /// Project directory
        path: PathBuf,

        /// Source video file
        media: PathBuf,

        /// JSON file with recorded interaction events
        #[arg(long)]
        events: Option<PathBuf>,

        /// Media duration in seconds (skips probing when given with --width/--height)
        #[arg(long)]
        duration: Option<f64>,

        /// Media width
        #[arg(long)]
        width: Option<u32>,

        /// Media height
        #[arg(long)]
        height: Option<u32>,
    },

    /// Show project information
    Info {
        /// Project directory
        path: PathBuf,

        /// Also show what is visible at this project time
        #[arg(long)]
        at: Option<f64>,
    },

    /// Validate the saved project
    Validate {
        /// Project directory
        path: PathBuf,
    },

    /// Split the clip that contains TIME
    Split {
        path: PathBuf,
        time: f64,
    },

    /// Move a clip to a new start time
    Move {
        path: PathBuf,
        clip: String,
        start: f64,
    },

    /// Trim a clip edge to a new project time
    Resize {
        path: PathBuf,
        clip: String,
        #[arg(value_enum)]
        edge: Edge,
        time: f64,
    },

    /// Delete clips or overlays
    Delete {
        path: PathBuf,
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Copy clips or overlays and paste them at TIME
    Duplicate {
        path: PathBuf,
        time: f64,
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Add an overlay from the template library
    AddOverlay {
        path: PathBuf,

        /// Template id (see `templates list`)
        template: String,

        /// Project time to insert at
        time: f64,

        /// JSON object merged over the template's default props
        #[arg(long)]
        props: Option<String>,
    },

    /// Change an overlay's start and end time
    Retime {
        path: PathBuf,
        overlay: String,
        start: f64,
        end: f64,
    },

    /// Merge a JSON object into an overlay's props
    SetProps {
        path: PathBuf,
        overlay: String,
        props: String,
    },

    /// Manage custom overlay templates
    Templates {
        path: PathBuf,

        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Export the project to video
    Export {
        /// Project directory
        path: PathBuf,

        /// Output file path (".mp4" is appended when missing)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output width (defaults to the source width)
        #[arg(long)]
        width: Option<u32>,

        /// Output height (defaults to the source height)
        #[arg(long)]
        height: Option<u32>,

        /// Output frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Write the per-frame composition plan as JSON
        #[arg(long)]
        plan: Option<PathBuf>,
    },

    /// Check system capabilities
    Check,
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List built-in and custom templates
    List,

    /// Create a custom HTML/CSS template
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        html: Option<String>,
        #[arg(long)]
        css: Option<String>,
    },

    /// Import a shared template file
    Import { file: PathBuf },

    /// Write a template to a file for sharing
    Export { id: String, file: PathBuf },

    /// Delete a custom template
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    init_logging(&logging);

    match cli.command {
        Commands::Init {
            path,
            media,
            events,
            duration,
            width,
            height,
        } => commands::init::run(&config, path, media, events, duration, width, height),
        Commands::Info { path, at } => commands::info::run(&config, path, at),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Split { path, time } => commands::edit::split(&config, path, time),
        Commands::Move { path, clip, start } => commands::edit::move_clip(&config, path, clip, start),
        Commands::Resize {
            path,
            clip,
            edge,
            time,
        } => {
            let edge = match edge {
                Edge::Left => launchreel_editor_core::ResizeEdge::Left,
                Edge::Right => launchreel_editor_core::ResizeEdge::Right,
            };
            commands::edit::resize(&config, path, clip, edge, time)
        }
        Commands::Delete { path, ids } => commands::edit::delete(&config, path, ids),
        Commands::Duplicate { path, time, ids } => {
            commands::edit::duplicate(&config, path, ids, time)
        }
        Commands::AddOverlay {
            path,
            template,
            time,
            props,
        } => commands::overlay::add(&config, path, template, time, props),
        Commands::Retime {
            path,
            overlay,
            start,
            end,
        } => commands::overlay::retime(&config, path, overlay, start, end),
        Commands::SetProps {
            path,
            overlay,
            props,
        } => commands::overlay::set_props(&config, path, overlay, props),
        Commands::Templates { path, action } => commands::templates::run(path, action),
        Commands::Export {
            path,
            output,
            width,
            height,
            fps,
            plan,
        } => commands::export::run(&config, path, output, width, height, fps, plan).await,
        Commands::Check => commands::check::run(&config),
    }
}
