use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use im::HashMap;
use regex::Regex;

/// Signature for native function values carried inside fixtures. Functions
/// compare by identity, never by behavior.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Represents a dynamically typed value under test.
///
/// Values form an owned tree: there is no way to construct a shared back-edge,
/// so cyclic graphs are unrepresentable and recursive traversal always
/// terminates.
///
/// # Examples
///
/// ```rust
/// use attest::Value;
/// let n = Value::Number(3.5);
/// assert_eq!(n.type_name(), "number");
/// let s = Value::from("hello");
/// assert_eq!(s.type_name(), "string");
/// let undef = Value::default();
/// assert!(undef.is_undefined());
/// ```
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Number(f64),
    Bool(bool),
    String(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    Regexp(Regex),
    Date(DateTime<Utc>),
    Function(NativeFn),
}

/// Semantic classification tag for a [`Value`].
///
/// Classification is a total enum match, so it can never fail or dereference
/// anything: there is no "constructor" to chase and no null case to guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Number,
    Boolean,
    String,
    Array,
    Object,
    Regexp,
    Date,
    Function,
}

impl ValueKind {
    /// Returns the lowercase tag name for this classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Undefined => "undefined",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Regexp => "regexp",
            ValueKind::Date => "date",
            ValueKind::Function => "function",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Value {
    /// Classifies this value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use attest::{Value, ValueKind};
    /// assert_eq!(Value::Bool(true).kind(), ValueKind::Boolean);
    /// assert_eq!(Value::List(vec![]).kind(), ValueKind::Array);
    /// ```
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Number(_) => ValueKind::Number,
            Value::Bool(_) => ValueKind::Boolean,
            Value::String(_) => ValueKind::String,
            Value::List(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Object,
            Value::Regexp(_) => ValueKind::Regexp,
            Value::Date(_) => ValueKind::Date,
            Value::Function(_) => ValueKind::Function,
        }
    }

    /// Returns the classification tag of the value as a string.
    pub fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Returns true if the value is Undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns the contained number if this is a Number value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use attest::Value;
    /// assert_eq!(Value::Number(2.0).as_number(), Some(2.0));
    /// assert_eq!(Value::from("nope").as_number(), None);
    /// ```
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained bool if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained text if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compiles `pattern` into a Regexp value.
    pub fn regexp(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Value::Regexp(Regex::new(pattern)?))
    }

    /// Wraps a native function as a value. Two wrappings of the same closure
    /// are distinct identities; clone the `Value` to share one.
    pub fn function(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Value::Function(Arc::new(f))
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    /// Helper for formatting list values
    fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }

    /// Helper for formatting map values. Keys are sorted so the rendering is
    /// deterministic regardless of hash order.
    fn fmt_map(f: &mut fmt::Formatter<'_>, map: &HashMap<String, Value>) -> fmt::Result {
        write!(f, "{{")?;
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        for (i, key) in keys.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if let Some(value) = map.get(key) {
                write!(f, "{}: {}", key, value)?;
            }
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => Value::fmt_list(f, items),
            Value::Map(map) => Value::fmt_map(f, map),
            Value::Regexp(r) => write!(f, "/{}/", r.as_str()),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::Function(_) => write!(f, "[function]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => {
                let ordered: std::collections::BTreeMap<&String, &Value> = map.iter().collect();
                f.debug_tuple("Map").field(&ordered).finish()
            }
            Value::Regexp(r) => f.debug_tuple("Regexp").field(&r.as_str()).finish(),
            Value::Date(d) => f.debug_tuple("Date").field(&d.to_rfc3339()).finish(),
            Value::Function(_) => f.write_str("Function(<native>)"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Regex> for Value {
    fn from(r: Regex) -> Self {
        Value::Regexp(r)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}
