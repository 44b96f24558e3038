use crate::{ChangeOptions, ModelEvent, ParseOptions};
use partialput_types::{Attributes, from_value};
use serde_json::Value;

/// A mutable record with attributes, an identity and a remote resource.
///
/// Implementors only need to provide attribute storage and a URL; the
/// mutation, parsing and serialization hooks have working defaults and are
/// overridden when a record needs custom behaviour (e.g. unwrapping an
/// envelope in `parse`, or adding computed fields in `to_json`).
pub trait Entity: Send + 'static {
    /// The attribute map.
    fn attributes(&self) -> &Attributes;

    /// Mutable access to the attribute map. Writes through this bypass
    /// change notification.
    fn attributes_mut(&mut self) -> &mut Attributes;

    /// Location of the remote resource backing this record.
    fn url(&self) -> String;

    /// Name of the identifier attribute.
    fn id_attribute(&self) -> &str {
        "id"
    }

    /// The identifier, if assigned. A `null` identifier counts as absent.
    fn id(&self) -> Option<&Value> {
        self.attributes()
            .get(self.id_attribute())
            .filter(|value| !value.is_null())
    }

    /// Whether the record has never been persisted remotely.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.attributes().get(key)
    }

    /// Applies `attrs` and returns the names of the attributes that actually
    /// changed. Emits one `Change` per changed attribute followed by a single
    /// `Changed`, unless `options.silent` is set.
    fn set(&mut self, attrs: Attributes, options: ChangeOptions) -> Vec<String> {
        let mut changed = Vec::new();
        for (key, value) in attrs {
            if options.unset {
                if self.attributes_mut().remove(&key).is_some() {
                    changed.push((key, Value::Null));
                }
            } else if self.attributes().get(&key) != Some(&value) {
                self.attributes_mut().insert(key.clone(), value.clone());
                changed.push((key, value));
            }
        }

        if !options.silent && !changed.is_empty() {
            for (attribute, value) in &changed {
                self.trigger(ModelEvent::Change {
                    attribute: attribute.clone(),
                    value: value.clone(),
                });
            }
            self.trigger(ModelEvent::Changed);
        }

        changed.into_iter().map(|(key, _)| key).collect()
    }

    /// Replaces the whole attribute map, emitting a single `Changed`
    /// unless `options.silent` is set.
    fn reset(&mut self, attrs: Attributes, options: ChangeOptions) {
        *self.attributes_mut() = attrs;
        if !options.silent {
            self.trigger(ModelEvent::Changed);
        }
    }

    /// Turns a response body into attributes.
    fn parse(&self, response: Value, _options: &ParseOptions) -> partialput_types::Result<Attributes> {
        from_value(response)
    }

    /// The JSON representation sent to the server.
    fn to_json(&self) -> Value {
        Value::Object(self.attributes().clone())
    }

    /// Delivers a notification to observers. No-op by default.
    fn trigger(&self, _event: ModelEvent) {}
}
