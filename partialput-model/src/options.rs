use partialput_types::Attributes;

/// Options for [`Entity::set`](crate::Entity::set) and
/// [`Entity::reset`](crate::Entity::reset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeOptions {
    /// Suppress change notifications.
    pub silent: bool,
    /// Remove the given attributes instead of assigning them.
    pub unset: bool,
}

impl ChangeOptions {
    /// Applies the change without notifying observers.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Default::default()
        }
    }

    /// Removes the given attributes.
    pub fn unset() -> Self {
        Self {
            unset: true,
            ..Default::default()
        }
    }
}

/// Options threaded through response parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOptions {
    /// Attributes as they were when the request was dispatched. When present,
    /// the parsed response is narrowed to the fields that differ from it.
    /// Consumed by the first parse that sees it.
    pub baseline: Option<Attributes>,
}

impl ParseOptions {
    /// Narrows the next parse against `baseline`.
    pub fn with_baseline(baseline: Attributes) -> Self {
        Self {
            baseline: Some(baseline),
        }
    }
}
