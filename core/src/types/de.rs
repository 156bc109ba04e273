//! Deserializers for fields Zendesk encodes loosely.
//!
//! Macro application results carry `comment.public` and `ticket_form_id` as
//! strings, and macro actions carry `value` as either one string or a list.

use serde::de::{self, Deserializer, Unexpected};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    String(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    String(String),
}

/// Parses the boolean spellings Zendesk emits: `1 t T TRUE true True` and
/// `0 f F FALSE false False`.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Accepts `"true"`-style strings as well as JSON booleans.
pub fn bool_from_str<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match BoolOrString::deserialize(de)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::String(s) => parse_bool(&s)
            .ok_or_else(|| de::Error::invalid_value(Unexpected::Str(&s), &"a boolean string")),
    }
}

/// Accepts a decimal string as well as a JSON integer.
pub fn i64_from_str<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(de)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::String(s) => s
            .parse()
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(&s), &"a decimal integer string")),
    }
}

/// Accepts a single scalar or a list of scalars; scalars are kept as their
/// string form. `null` yields an empty list.
pub fn string_or_seq<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.into_iter().map(scalar_to_string::<D::Error>).collect(),
        other => Ok(vec![scalar_to_string(other)?]),
    }
}

fn scalar_to_string<E: de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) => Err(E::invalid_type(Unexpected::Seq, &"a string")),
        Value::Object(_) => Err(E::invalid_type(Unexpected::Map, &"a string")),
    }
}
