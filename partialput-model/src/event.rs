use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notifications emitted by an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelEvent {
    /// A single attribute changed. `value` is `null` for removed attributes.
    Change { attribute: String, value: Value },
    /// Emitted once after a mutation that changed at least one attribute.
    Changed,
    /// A fetch or save completed successfully.
    Sync,
    /// A fetch or save failed.
    Error { message: String },
}

impl ModelEvent {
    /// Returns the attribute name for `Change` events.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            ModelEvent::Change { attribute, .. } => Some(attribute),
            _ => None,
        }
    }
}
