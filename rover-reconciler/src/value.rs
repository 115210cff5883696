use chrono::{DateTime, Utc};
use smartstring::alias::String as SmartString;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Property bag of a retained node or a pending element.
pub type Props = HashMap<SmartString, PropValue>;

/// Interior-mutable value shared between several bags.
pub type SharedValue = Rc<RefCell<PropValue>>;

/// Opaque handler stored in a property bag (`on_click`, `on_change`, ...).
/// Two callbacks are the same only if they are the same allocation.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&[PropValue])>);

impl Callback {
    pub fn new(f: impl Fn(&[PropValue]) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, args: &[PropValue]) {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Value stored under one key of a property bag
#[derive(Debug, Clone)]
pub enum PropValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(SmartString),
    List(Vec<PropValue>),
    /// Unordered collection, compared by membership
    Set(Vec<PropValue>),
    Map(HashMap<SmartString, PropValue>),
    /// Generic structured record, compared field by field
    Object(HashMap<SmartString, PropValue>),
    Date(DateTime<Utc>),
    Callback(Callback),
    Shared(SharedValue),
}

impl PropValue {
    pub fn shared(value: PropValue) -> Self {
        PropValue::Shared(Rc::new(RefCell::new(value)))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, PropValue::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String-keyed entries of a `Map` or `Object`
    pub fn entries(&self) -> Option<&HashMap<SmartString, PropValue>> {
        match self {
            PropValue::Map(m) | PropValue::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Name of the runtime category, used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            PropValue::Nil => "nil",
            PropValue::Bool(_) => "bool",
            PropValue::Int(_) | PropValue::Float(_) => "number",
            PropValue::String(_) => "string",
            PropValue::List(_) => "list",
            PropValue::Set(_) => "set",
            PropValue::Map(_) => "map",
            PropValue::Object(_) => "object",
            PropValue::Date(_) => "date",
            PropValue::Callback(_) => "callback",
            PropValue::Shared(_) => "shared",
        }
    }

    /// Text form used when a value becomes a text literal payload
    pub fn to_display_string(&self) -> String {
        match self {
            PropValue::Nil => String::new(),
            PropValue::Bool(b) => b.to_string(),
            PropValue::Int(i) => i.to_string(),
            PropValue::Float(f) => f.to_string(),
            PropValue::String(s) => s.to_string(),
            PropValue::Date(d) => d.to_rfc3339(),
            PropValue::Shared(inner) => inner.borrow().to_display_string(),
            other => format!("[{}]", other.type_name()),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value.into())
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(value: Vec<PropValue>) -> Self {
        PropValue::List(value)
    }
}

impl From<DateTime<Utc>> for PropValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropValue::Date(value)
    }
}

impl From<Callback> for PropValue {
    fn from(value: Callback) -> Self {
        PropValue::Callback(value)
    }
}

impl From<serde_json::Value> for PropValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => PropValue::Nil,
            Value::Bool(b) => PropValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PropValue::Int(i),
                None => PropValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => PropValue::String(s.into()),
            Value::Array(items) => PropValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(fields) => PropValue::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (SmartString::from(k), v.into()))
                    .collect(),
            ),
        }
    }
}

/// Build a bag from key/value pairs
pub fn props<K, V, I>(entries: I) -> Props
where
    K: Into<SmartString>,
    V: Into<PropValue>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Build a bag from a JSON object; anything else yields an empty bag
pub fn props_from_json(value: serde_json::Value) -> Props {
    match value {
        serde_json::Value::Object(fields) => fields
            .into_iter()
            .map(|(k, v)| (SmartString::from(k), PropValue::from(v)))
            .collect(),
        _ => Props::new(),
    }
}
