//! Leaf value kinds
//!
//! Each [`Kind`] is a stateless setter: it knows its zero value and how to
//! coerce a raw JSON value into its canonical representation.
//!
//! | Kind      | Default | Accepts                                             |
//! |-----------|---------|-----------------------------------------------------|
//! | `text`    | `""`    | strings, numbers (rendered as decimal text)          |
//! | `number`  | `0`     | numbers, numeric strings                            |
//! | `boolean` | `0`     | booleans, numbers, `1/0 true/false yes/no on/off`   |
//! | `map`     | `{}`    | objects                                             |
//! | `list`    | `[]`    | arrays                                              |
//!
//! Boolean fields always hold the integers `0` or `1`, never JSON booleans.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Primitive value kind of a leaf field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[serde(alias = "string")]
    Text,
    Number,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "object")]
    Map,
    #[serde(alias = "array")]
    List,
}

/// A raw value the kind could not interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindMismatch {
    pub expected: &'static str,
    pub actual: &'static str,
}

impl Kind {
    /// Lowercase name used in declarations and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Text => "text",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Map => "map",
            Kind::List => "list",
        }
    }

    /// The kind's zero value
    pub fn default_value(&self) -> Value {
        match self {
            Kind::Text => Value::String(String::new()),
            Kind::Number | Kind::Boolean => Value::from(0),
            Kind::Map => Value::Object(Map::new()),
            Kind::List => Value::Array(Vec::new()),
        }
    }

    /// Coerce a raw value into this kind's canonical representation
    pub fn coerce(&self, raw: &Value) -> Result<Value, KindMismatch> {
        let coerced = match self {
            Kind::Text => coerce_text(raw),
            Kind::Number => coerce_number(raw),
            Kind::Boolean => coerce_boolean(raw).map(|b| Value::from(u8::from(b))),
            Kind::Map => raw.is_object().then(|| raw.clone()),
            Kind::List => raw.is_array().then(|| raw.clone()),
        };

        coerced.ok_or(KindMismatch {
            expected: self.as_str(),
            actual: json_type_name(raw),
        })
    }

    /// Whether a stored value already has this kind's canonical shape
    pub fn holds(&self, value: &Value) -> bool {
        match self {
            Kind::Text => value.is_string(),
            Kind::Number => value.is_number(),
            Kind::Boolean => matches!(value.as_u64(), Some(0 | 1)),
            Kind::Map => value.is_object(),
            Kind::List => value.is_array(),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn coerce_text(raw: &Value) -> Option<Value> {
    match raw {
        Value::String(_) => Some(raw.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        _ => None,
    }
}

fn coerce_number(raw: &Value) -> Option<Value> {
    match raw {
        Value::Number(_) => Some(raw.clone()),
        Value::String(s) => parse_number(s.trim()).map(Value::Number),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::from(u));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn coerce_boolean(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Name of a raw value's JSON type, for diagnostics
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
