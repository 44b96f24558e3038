//! Sync state tracking.
//!
//! Holds the attributes as last confirmed by the server. Everything dirty
//! tracking needs is derived from it on demand rather than kept in step with
//! every mutation.

use partialput_types::{Attributes, diff_attributes, merge_into};
use serde::{Deserialize, Serialize};

/// The last-synced snapshot for one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// `None` until the first fetch or save is dispatched.
    synced: Option<Attributes>,
}

impl SyncState {
    /// Creates a state for a never-synced entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot, if any.
    pub fn synced(&self) -> Option<&Attributes> {
        self.synced.as_ref()
    }

    /// Whether a snapshot exists.
    pub fn has_synced(&self) -> bool {
        self.synced.is_some()
    }

    /// Entries of `attrs` that differ from the snapshot, or all of `attrs`
    /// when there is no snapshot.
    pub fn unsaved(&self, attrs: &Attributes) -> Attributes {
        match &self.synced {
            Some(synced) => diff_attributes(attrs, synced),
            None => attrs.clone(),
        }
    }

    /// Replaces the snapshot, returning the previous one.
    pub fn replace(&mut self, synced: Option<Attributes>) -> Option<Attributes> {
        std::mem::replace(&mut self.synced, synced)
    }

    /// Marks `attrs` as the server-confirmed state.
    pub fn mark_synced(&mut self, attrs: Attributes) {
        self.synced = Some(attrs);
    }

    /// Overlays server-confirmed `changes` onto the snapshot.
    pub fn merge(&mut self, changes: Attributes) {
        match &mut self.synced {
            Some(synced) => merge_into(synced, changes),
            None => self.synced = Some(changes),
        }
    }
}
