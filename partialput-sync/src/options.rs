//! Per-call options for reconciler operations.

/// Options for [`Reconciler::save`](crate::Reconciler::save).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Send only unsaved + core + identifier attributes, and narrow the
    /// response to fields the server changed.
    pub partial: bool,
    /// Keep dirty local values when the response is applied. `None` uses
    /// the reconciler's configured default.
    pub protect_unsaved: Option<bool>,
    /// Update existing records with `Patch` instead of `Update`.
    pub patch: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            partial: true,
            protect_unsaved: None,
            patch: false,
        }
    }
}

impl SaveOptions {
    /// Sends the full JSON representation and applies the whole response.
    pub fn full() -> Self {
        Self {
            partial: false,
            ..Default::default()
        }
    }

    /// Partial save sent as `Patch` for persisted records.
    pub fn patch() -> Self {
        Self {
            patch: true,
            ..Default::default()
        }
    }

    /// Overrides the configured `protect_unsaved` default.
    #[must_use]
    pub fn protect_unsaved(mut self, protect: bool) -> Self {
        self.protect_unsaved = Some(protect);
        self
    }
}

/// Options for [`Reconciler::fetch`](crate::Reconciler::fetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Apply only the response fields that differ from the attributes at
    /// request time.
    pub partial: bool,
    pub protect_unsaved: Option<bool>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            partial: true,
            protect_unsaved: None,
        }
    }
}

impl FetchOptions {
    /// Applies the whole response.
    pub fn full() -> Self {
        Self {
            partial: false,
            ..Default::default()
        }
    }

    /// Overrides the configured `protect_unsaved` default.
    #[must_use]
    pub fn protect_unsaved(mut self, protect: bool) -> Self {
        self.protect_unsaved = Some(protect);
        self
    }
}

/// Options for [`Reconciler::set`](crate::Reconciler::set).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub silent: bool,
    pub unset: bool,
    /// Remove attributes that are absent from the incoming map.
    pub clear: bool,
    /// Drop incoming keys whose current value is unsaved.
    pub protect_unsaved: Option<bool>,
}

impl SetOptions {
    /// Sets without change notifications.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Default::default()
        }
    }

    /// Removes attributes missing from the incoming map.
    pub fn clear() -> Self {
        Self {
            clear: true,
            ..Default::default()
        }
    }

    /// Overrides the configured `protect_unsaved` default.
    #[must_use]
    pub fn protect_unsaved(mut self, protect: bool) -> Self {
        self.protect_unsaved = Some(protect);
        self
    }
}

/// Options for [`Reconciler::to_json`](crate::Reconciler::to_json).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonOptions {
    /// Serialize only unsaved + core + identifier attributes.
    pub partial: bool,
}

impl JsonOptions {
    /// Serializes only unsaved, core and identifier attributes.
    pub fn partial() -> Self {
        Self { partial: true }
    }
}
