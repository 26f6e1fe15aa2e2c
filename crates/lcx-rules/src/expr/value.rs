//! Runtime values of the expression language.

use std::collections::BTreeMap;
use std::fmt;

/// A value produced by evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent or unknown. Propagates through comparisons.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number (all numbers are `f64`).
    Number(f64),
    /// String.
    String(String),
    /// List.
    List(Vec<Value>),
    /// Object, from a context document.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "object",
        }
    }

    /// `true` for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Present: not null, not a blank string, not an empty list or object.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Null => false,
            Self::String(s) => !s.trim().is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Map(map) => !map.is_empty(),
            Self::Bool(_) | Self::Number(_) => true,
        }
    }

    /// Text form for string functions: strings as-is, numbers and booleans
    /// rendered, everything else `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(format_number(*n)),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Map(map.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => write!(f, "{{{} keys}}", map.len()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_conversion() {
        let v = Value::from(&serde_json::json!({"a": [1, "x", null], "b": true}));
        let Value::Map(map) = v else {
            panic!("expected map");
        };
        assert_eq!(
            map["a"],
            Value::List(vec![
                Value::Number(1.0),
                Value::String("x".into()),
                Value::Null
            ])
        );
        assert_eq!(map["b"], Value::Bool(true));
    }

    #[test]
    fn presence() {
        assert!(!Value::Null.is_present());
        assert!(!Value::String("  ".into()).is_present());
        assert!(Value::Number(0.0).is_present());
        assert!(Value::Bool(false).is_present());
    }

    #[test]
    fn integers_render_without_fraction() {
        assert_eq!(Value::Number(21.0).to_string(), "21");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
    }
}
