//! LaunchReel Common Utilities
//!
//! Shared infrastructure for all LaunchReel crates:
//! - Error types and result aliases
//! - Wall clock and drift helpers used by playback and export
//! - Tracing/logging initialization
//! - Configuration loading, including the tunable editor constants

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
