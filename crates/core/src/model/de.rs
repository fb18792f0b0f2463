//! Lenient deserializers for backend payloads.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treats an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Option labels are free-form JSON on the backend; numbers and booleans are
/// rendered as their JSON text so they can be selected like any other label.
pub(crate) fn option_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.into_iter().map(label_from_value).collect())
}

pub(crate) fn optional_labels<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw.map(|values| values.into_iter().map(label_from_value).collect()))
}

fn label_from_value(value: Value) -> String {
    match value {
        Value::String(label) => label,
        other => other.to_string(),
    }
}
