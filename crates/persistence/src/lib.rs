//! LaunchReel Persistence
//!
//! Durable storage behind two small seams:
//! - a key-value store holding the project document and custom templates
//! - a blob store holding imported media and overlay-referenced assets
//!
//! [`Persistence`] turns local media references in overlay props into blob
//! ids on save and back into fresh local references on restore.
//! [`AutoSaver`] debounces saves on a tokio task.

pub mod autosave;
pub mod error;
pub mod project_store;
pub mod refs;
pub mod store;

pub use autosave::AutoSaver;
pub use error::{StoreError, StoreResult};
pub use project_store::{Persistence, ProjectSnapshot, RestoredProject};
pub use refs::{FileRefs, LocalRefs};
pub use store::{Blob, BlobStore, DirStore, KeyValueStore};
