//! Element references and attribute values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to one element of the remote tree.
///
/// Two references are equal iff they denote the same remote object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(u64);

impl ElementRef {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Attribute value as reported by the transport
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Point { x: f64, y: f64 },
    Size { width: f64, height: f64 },
    Element(ElementRef),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementRef> {
        match self {
            Value::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn into_element(self) -> Option<ElementRef> {
        match self {
            Value::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Element references held by an array value, skipping anything else.
    pub fn into_elements(self) -> Vec<ElementRef> {
        match self {
            Value::Array(items) => items.into_iter().filter_map(Value::into_element).collect(),
            Value::Element(element) => vec![element],
            _ => Vec::new(),
        }
    }

    /// Text form used when matching values against patterns.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Point { x, y } => write!(f, "({x}, {y})"),
            Value::Size { width, height } => write!(f, "{width}x{height}"),
            Value::Element(element) => write!(f, "{element}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ElementRef> for Value {
    fn from(value: ElementRef) -> Self {
        Value::Element(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_coercion() {
        assert_eq!(Value::from("OK").to_text(), "OK");
        assert_eq!(Value::from(true).to_text(), "true");
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Point { x: 1.0, y: 2.5 }.to_text(), "(1, 2.5)");
        assert_eq!(Value::from(vec![1, 2]).to_text(), "[1, 2]");
    }

    #[test]
    fn test_into_elements_skips_non_elements() {
        let value = Value::Array(vec![
            Value::Element(ElementRef::new(3)),
            Value::Null,
            Value::Element(ElementRef::new(9)),
        ]);
        assert_eq!(
            value.into_elements(),
            vec![ElementRef::new(3), ElementRef::new(9)]
        );
    }

    #[test]
    fn test_tagged_json_shape() {
        let point = serde_json::to_value(Value::Point { x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(
            point,
            serde_json::json!({"type": "point", "value": {"x": 1.0, "y": 2.0}})
        );

        let element = serde_json::to_value(Value::Element(ElementRef::new(7))).unwrap();
        assert_eq!(element, serde_json::json!({"type": "element", "value": 7}));
    }
}
