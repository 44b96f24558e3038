//! Attribute maps and the diff helpers dirty tracking is built on.

use crate::{Error, Result};
use serde_json::{Map, Value};
use tracing::warn;

/// An entity's attributes: attribute name → JSON value.
pub type Attributes = Map<String, Value>;

/// Returns the entries of `current` whose value differs from `baseline`.
///
/// Equality is deep `Value` equality. A key missing from `baseline` always
/// counts as different; keys present only in `baseline` are not reported.
pub fn diff_attributes(current: &Attributes, baseline: &Attributes) -> Attributes {
    current
        .iter()
        .filter(|(key, value)| baseline.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Projects `attrs` onto `keys`, skipping keys that are not present.
pub fn pick<'a>(attrs: &Attributes, keys: impl IntoIterator<Item = &'a str>) -> Attributes {
    keys.into_iter()
        .filter_map(|key| attrs.get(key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

/// Overlays `source` onto `target`, replacing values for shared keys.
pub fn merge_into(target: &mut Attributes, source: Attributes) {
    for (key, value) in source {
        target.insert(key, value);
    }
}

/// Keys present in `current` but absent from `incoming`.
pub fn removed_keys(current: &Attributes, incoming: &Attributes) -> Vec<String> {
    current
        .keys()
        .filter(|key| !incoming.contains_key(key.as_str()))
        .cloned()
        .collect()
}

/// Converts a JSON value into an attribute map.
///
/// `null` (an empty response body) becomes an empty map; any other
/// non-object value is rejected.
pub fn from_value(value: Value) -> Result<Attributes> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Attributes::new()),
        other => Err(Error::NotAnObject(kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Call forms accepted wherever attributes are passed in bulk.
///
/// Implemented for attribute maps, JSON objects, `(key, value)` pairs and
/// `Option`s of those, so `set(("title", "x"))` and `set(json!({..}))` read the
/// same at the call site.
pub trait IntoAttributes {
    fn into_attributes(self) -> Attributes;
}

impl IntoAttributes for Attributes {
    fn into_attributes(self) -> Attributes {
        self
    }
}

impl IntoAttributes for Value {
    fn into_attributes(self) -> Attributes {
        match from_value(self) {
            Ok(attrs) => attrs,
            Err(e) => {
                warn!("ignoring attributes: {e}");
                Attributes::new()
            }
        }
    }
}

impl<K, V> IntoAttributes for (K, V)
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_attributes(self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(self.0.into(), self.1.into());
        attrs
    }
}

impl<T: IntoAttributes> IntoAttributes for Option<T> {
    fn into_attributes(self) -> Attributes {
        self.map(IntoAttributes::into_attributes).unwrap_or_default()
    }
}

impl IntoAttributes for () {
    fn into_attributes(self) -> Attributes {
        Attributes::new()
    }
}
