//! Lenient decoding helpers for wire DTO fields.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NanosWire {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

/// Decodes a nanosecond timestamp sent either as a decimal string (the
/// canonical form, since JSON numbers lose precision above 2^53) or as a
/// plain integer.
pub(crate) fn nanos<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<NanosWire>::deserialize(deserializer)?.map(|wire| match wire {
            NanosWire::Text(s) => s,
            NanosWire::Signed(n) => n.to_string(),
            NanosWire::Unsigned(n) => n.to_string(),
        }),
    )
}

/// Treats empty id strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
