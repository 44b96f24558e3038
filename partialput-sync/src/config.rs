use crate::error::SyncResult;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Reconciler`](crate::Reconciler).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Attributes included in every partial payload whether dirty or not.
    /// The identifier attribute is always included, so the empty default
    /// sends the identifier only.
    pub partial_attributes_core: Vec<String>,
    /// Default for `protect_unsaved` when a call does not say otherwise.
    pub protect_unsaved: bool,
}

impl ReconcilerConfig {
    /// Parses a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replaces the core attribute set.
    #[must_use]
    pub fn with_core<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partial_attributes_core = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the default for `protect_unsaved`.
    #[must_use]
    pub fn with_protect_unsaved(mut self, protect: bool) -> Self {
        self.protect_unsaved = protect;
        self
    }
}
