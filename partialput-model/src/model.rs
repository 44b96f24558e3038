use crate::{Entity, ModelEvent};
use partialput_types::{Attributes, IntoAttributes};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

/// Buffered notifications per subscriber before lagging receivers drop events.
const EVENT_CAPACITY: usize = 256;

/// A plain in-memory entity.
///
/// Resources live at `{url_root}/{id}`; unsaved records post to `url_root`.
/// Notifications go out on a broadcast channel, see [`Model::subscribe`].
#[derive(Debug)]
pub struct Model {
    attributes: Attributes,
    id_attribute: String,
    url_root: String,
    events: broadcast::Sender<ModelEvent>,
}

impl Model {
    /// Creates a model with initial attributes.
    pub fn new(url_root: impl Into<String>, attrs: impl IntoAttributes) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            attributes: attrs.into_attributes(),
            id_attribute: "id".to_string(),
            url_root: url_root.into(),
            events,
        }
    }

    /// Uses `name` as the identifier attribute instead of `"id"`.
    #[must_use]
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = name.into();
        self
    }

    /// The collection URL records of this kind live under.
    pub fn url_root(&self) -> &str {
        &self.url_root
    }

    /// Subscribes to change and sync notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ModelEvent> {
        self.events.subscribe()
    }
}

impl Entity for Model {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn url(&self) -> String {
        let root = self.url_root.trim_end_matches('/');
        match self.id() {
            Some(Value::String(id)) => format!("{root}/{id}"),
            Some(id) => format!("{root}/{id}"),
            None => root.to_string(),
        }
    }

    fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    fn trigger(&self, event: ModelEvent) {
        // No subscribers is not an error.
        if self.events.send(event).is_err() {
            trace!("model event dropped, no subscribers");
        }
    }
}
