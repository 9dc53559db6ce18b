//! Forgiving field decoders for persisted forests.
//!
//! Stored payloads were written by older clients and sometimes carry `null`
//! or a number where a string belongs. One bad field must not make the whole
//! forest unreadable, so these fall back to the field's default.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// String field: `null` and non-scalar values become `""`, numbers and
/// booleans keep their textual form.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextInput {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
        Other(IgnoredAny),
    }

    Ok(match TextInput::deserialize(deserializer)? {
        TextInput::Text(value) => value,
        TextInput::Integer(value) => value.to_string(),
        TextInput::Float(value) => value.to_string(),
        TextInput::Flag(value) => value.to_string(),
        TextInput::Other(_) => String::new(),
    })
}

/// Any field whose `null` means "not set".
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
