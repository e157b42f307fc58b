//! Application configuration.
//!
//! The row-packing tolerance, drift thresholds and export timings were tuned
//! by hand and live here so they can be changed without touching the
//! algorithms that consume them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where projects are stored.
    pub projects_dir: PathBuf,

    /// Timeline editing constants.
    pub editor: EditorTuning,

    /// Media synchronization thresholds.
    pub sync: SyncTuning,

    /// Offline export parameters.
    pub export: ExportTuning,

    /// Auto-save behaviour.
    pub persistence: PersistenceTuning,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Constants used by edit operations and row packing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorTuning {
    /// Two items touching within this many seconds may share a row.
    pub row_pack_epsilon: f64,

    /// Shortest clip a resize may produce (seconds).
    pub min_clip_duration: f64,

    /// Overlay duration when the template does not declare one (seconds).
    pub default_overlay_duration: f64,

    /// Duration of auto-placed click ripples (seconds).
    pub ripple_duration: f64,
}

/// Drift hysteresis for the media synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTuning {
    /// Allowed drift while the clock is playing (seconds).
    pub playing_drift_threshold: f64,

    /// Allowed drift while paused or scrubbing (seconds).
    pub paused_drift_threshold: f64,

    /// Delay before retrying a seek requested while another is in flight (seconds).
    pub seek_defer: f64,
}

/// Offline export parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportTuning {
    /// Output frame rate.
    pub fps: u32,

    /// Every Nth frame is encoded as a keyframe.
    pub keyframe_interval: u64,

    /// Progress is reported every N frames.
    pub progress_interval: u64,

    /// Upper bound on waiting for a seek to complete.
    pub seek_timeout_ms: u64,

    /// Delay after a seek so the overlay layer can re-render.
    pub settle_delay_ms: u64,
}

/// Auto-save behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceTuning {
    /// Quiet period after the last change before the project is saved.
    pub autosave_debounce_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "launchreel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EditorTuning {
    fn default() -> Self {
        Self {
            row_pack_epsilon: 0.01,
            min_clip_duration: 0.1,
            default_overlay_duration: 3.0,
            ripple_duration: 0.6,
        }
    }
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            playing_drift_threshold: 0.25,
            paused_drift_threshold: 0.05,
            seek_defer: 0.05,
        }
    }
}

impl Default for ExportTuning {
    fn default() -> Self {
        Self {
            fps: 30,
            keyframe_interval: 30,
            progress_interval: 30,
            seek_timeout_ms: 1000,
            settle_delay_ms: 100,
        }
    }
}

impl Default for PersistenceTuning {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 2000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        let mut config = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        if config.projects_dir.as_os_str().is_empty() {
            config.projects_dir = dirs_default_projects();
        }
        config
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("launchreel").join("config.json")
}

/// Default projects directory.
fn dirs_default_projects() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("launchreel").join("projects")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_values() {
        let config = AppConfig::default();
        assert!((config.editor.row_pack_epsilon - 0.01).abs() < 1e-12);
        assert!((config.sync.playing_drift_threshold - 0.25).abs() < 1e-12);
        assert!((config.sync.paused_drift_threshold - 0.05).abs() < 1e-12);
        assert_eq!(config.export.fps, 30);
        assert_eq!(config.persistence.autosave_debounce_ms, 2000);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"sync":{"playing_drift_threshold":0.3}}"#).unwrap();
        assert!((parsed.sync.playing_drift_threshold - 0.3).abs() < 1e-12);
        assert!((parsed.sync.paused_drift_threshold - 0.05).abs() < 1e-12);
        assert_eq!(parsed.export.keyframe_interval, 30);
        assert_eq!(parsed.logging.level, "info");
    }
}
