//! LaunchReel Project Model
//!
//! Defines the core data contracts for LaunchReel projects:
//! - **Clips:** placed windows of source media on the project timeline
//! - **Overlays:** timed, typed visual effects with opaque property bags
//! - **Templates:** the built-in and custom overlay library
//! - **Time:** pure conversions between project time, source time and
//!   display coordinates, plus lane packing
//! - **Project:** the persisted project document
//!
//! All times are seconds as `f64` on the project time axis unless a name
//! says otherwise.

pub mod clip;
pub mod event;
pub mod overlay;
pub mod project;
pub mod template;
pub mod time;

pub use clip::*;
pub use event::*;
pub use overlay::*;
pub use project::*;
pub use template::*;
pub use time::*;
