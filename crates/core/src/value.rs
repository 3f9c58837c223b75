//! Dynamic runtime values passed through join points
//!
//! Woven call sites hand arguments, receivers and results to the interceptor
//! chain as [`Value`]s. Objects are shared, interior-mutable property bags so
//! that field-access join points can read and write them.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a live object
pub type ObjectRef = Arc<Object>;

/// A dynamically typed value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            // Objects compare by identity
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(object) => write!(f, "object({})", object.class()),
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
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

/// A live instance of a woven class
#[derive(Debug)]
pub struct Object {
    class: String,
    properties: RwLock<BTreeMap<String, Value>>,
}

impl Object {
    /// Create an empty instance of `class`
    pub fn new(class: impl Into<String>) -> ObjectRef {
        Arc::new(Self {
            class: class.into(),
            properties: RwLock::new(BTreeMap::new()),
        })
    }

    /// Create an instance with initial property values
    pub fn with_properties<I, K>(class: impl Into<String>, properties: I) -> ObjectRef
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Arc::new(Self {
            class: class.into(),
            properties: RwLock::new(
                properties
                    .into_iter()
                    .map(|(name, value)| (name.into(), value))
                    .collect(),
            ),
        })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Current value of a property, `Null` when unset
    pub fn get(&self, name: &str) -> Value {
        self.properties.read().get(name).cloned().unwrap_or_default()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.properties.write().insert(name.into(), value);
    }
}

/// An exception raised by a real operation or by advice
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{class}: {message}")]
pub struct Exception {
    pub class: String,
    pub message: String,
}

impl Exception {
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
        }
    }
}

impl From<crate::error::Error> for Exception {
    fn from(err: crate::error::Error) -> Self {
        Exception::new("MatchError", err.to_string())
    }
}
