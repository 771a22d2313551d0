//! Typed structured-log fields.
//!
//! Every value a log line can carry is one of the [`FieldValue`] variants, and
//! [`encode`] is the only place that turns them into text.

use std::fmt::{self, Write};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Bool(bool),
    Float(f64),
    Duration(Duration),
    List(Vec<String>),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn str(key: &'static str, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Str(value.into()))
    }

    pub fn int(key: &'static str, value: i64) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn uint(key: &'static str, value: u64) -> Self {
        Self::new(key, FieldValue::Uint(value))
    }

    pub fn bool(key: &'static str, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn float(key: &'static str, value: f64) -> Self {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn duration(key: &'static str, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    pub fn list<I, S>(key: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            key,
            FieldValue::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// `error=<display>`
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::new("error", FieldValue::Error(err.to_string()))
    }

    pub fn env(value: impl Into<String>) -> Self {
        Self::str("env", value)
    }

    pub fn version(value: impl Into<String>) -> Self {
        Self::str("version", value)
    }

    pub fn service(value: impl Into<String>) -> Self {
        Self::str("service", value)
    }

    pub fn server(name: impl Into<String>) -> Self {
        Self::str("server", name)
    }

    pub fn addr(addr: impl fmt::Display) -> Self {
        Self::str("addr", addr.to_string())
    }

    pub fn elapsed(value: Duration) -> Self {
        Self::duration("elapsed", value)
    }

    fn new(key: &'static str, value: FieldValue) -> Self {
        Self { key, value }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) | FieldValue::Error(s) => write_text(f, s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Duration(d) => write!(f, "{}", humantime::format_duration(*d)),
            FieldValue::List(items) => write_text(f, &format!("[{}]", items.join(","))),
        }
    }
}

/// Render fields as space separated `key=value` pairs.
/// Values that are empty or contain whitespace, quotes or `=` are quoted.
pub fn encode(fields: &[Field]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing into a String cannot fail
        let _ = write!(out, "{}={}", field.key, field.value);
    }
    out
}

fn write_text(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if needs_quotes(s) {
        write!(f, "{:?}", s)
    } else {
        f.write_str(s)
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '=' || c.is_control())
}
