//! Entity model for partialput.
//!
//! Defines the record abstraction the sync layer composes over:
//! - [`Entity`]: capability trait covering attribute storage, mutation with change
//!   notification, response parsing and JSON serialization
//! - [`Model`]: a plain in-memory `Entity` backed by a broadcast channel
//! - [`ModelEvent`]: change and sync notifications
//! - [`ChangeOptions`] / [`ParseOptions`]: per-call knobs for `set` and `parse`
//!
//! The sync layer never reaches into a concrete type; anything implementing
//! `Entity` can be reconciled.

mod entity;
mod event;
mod model;
mod options;

pub use entity::Entity;
pub use event::ModelEvent;
pub use model::Model;
pub use options::{ChangeOptions, ParseOptions};
