//! Native values held by model instances, and helpers for plain documents.
//!
//! A *plain document* is untyped hierarchical data following the JSON object model; it's represented
//! with [`serde_json::Value`]. A *native value* ([`Value`]) is what a [`Field`](crate::Field) produces
//! from a plain value; it differs from the plain representation in that nested models are represented
//! by [`ModelInstance`]s.

use std::fmt;

use crate::instance::{DumpOptions, ModelInstance};

/// JSON object used as a plain document.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Native value of a model field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// String value.
    String(String),
    /// Sequence of values.
    Array(Vec<Value>),
    /// Nested model instance.
    Model(ModelInstance),
    /// Plain value without a native counterpart (e.g., a floating-point number or an object provided
    /// for a scalar field). Such values are retained by tolerant loading, but never pass validation.
    Plain(serde_json::Value),
}

impl Value {
    /// Checks whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the Boolean value, if this is a Boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns array items, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns a model instance, if this is a nested model.
    pub fn as_model(&self) -> Option<&ModelInstance> {
        match self {
            Self::Model(instance) => Some(instance),
            _ => None,
        }
    }

    /// Returns a mutable model instance, if this is a nested model.
    pub fn as_model_mut(&mut self) -> Option<&mut ModelInstance> {
        match self {
            Self::Model(instance) => Some(instance),
            _ => None,
        }
    }

    /// Converts a plain scalar into a native value without type checks.
    pub(crate) fn from_plain_scalar(plain: &serde_json::Value) -> Self {
        match plain {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(*value),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map_or_else(|| Self::Plain(plain.clone()), Self::Integer),
            serde_json::Value::String(value) => Self::String(value.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Self::Plain(plain.clone()),
        }
    }

    /// Converts this value to the plain representation. Nested models are dumped with nulls
    /// if `include_nulls` is set.
    pub fn to_plain(&self, include_nulls: bool) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(value) => (*value).into(),
            Self::Integer(value) => (*value).into(),
            Self::String(value) => value.clone().into(),
            Self::Array(items) => items
                .iter()
                .map(|item| item.to_plain(include_nulls))
                .collect(),
            Self::Model(instance) => {
                let options = if include_nulls {
                    DumpOptions::with_nulls()
                } else {
                    DumpOptions::default()
                };
                options.dump(instance).into()
            }
            Self::Plain(value) => value.clone(),
        }
    }

    /// Human-readable description of the value used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Bool(value) => format!("Boolean {value}"),
            Self::Integer(value) => format!("integer {value}"),
            Self::String(value) => format!("string {value:?}"),
            Self::Array(items) => format!("array with {} item(s)", items.len()),
            Self::Model(instance) => format!("model `{}`", instance.model_name()),
            Self::Plain(value) => describe_plain(value),
        }
    }
}

/// Human-readable description of a plain value used in error messages.
pub(crate) fn describe_plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_owned(),
        serde_json::Value::Bool(value) => format!("Boolean {value}"),
        serde_json::Value::Number(number) if number.is_i64() => format!("integer {number}"),
        serde_json::Value::Number(number) if number.is_u64() => {
            format!("integer {number} out of range")
        }
        serde_json::Value::Number(number) => format!("float {number}"),
        serde_json::Value::String(value) => format!("string {value:?}"),
        serde_json::Value::Array(_) => "array".to_owned(),
        serde_json::Value::Object(_) => "object".to_owned(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_plain(false), formatter)
    }
}

macro_rules! impl_from_integer {
    ($($int:ty),+) => {
        $(
        impl From<$int> for Value {
            fn from(value: $int) -> Self {
                Self::Integer(value.into())
            }
        }
        )+
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.as_integer() == Some(*other)
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        self.as_integer() == Some((*other).into())
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ModelInstance> for Value {
    fn from(instance: ModelInstance) -> Self {
        Self::Model(instance)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Resolves a dot-separated `path` in a plain document. Objects are indexed by keys, arrays by indices.
/// Returns `None` for an empty path, or if any path segment cannot be resolved.
///
/// # Examples
///
/// ```
/// # use garlic_config::value::resolve;
/// let document = serde_json::json!({
///     "info": { "working": true, "kids": [{ "name": "Sam" }] },
/// });
/// assert_eq!(resolve(&document, "info.working"), Some(&true.into()));
/// assert_eq!(resolve(&document, "info.kids.0.name"), Some(&"Sam".into()));
/// assert_eq!(resolve(&document, "info.missing"), None);
/// assert_eq!(resolve(&document, ""), None);
/// ```
pub fn resolve<'a>(document: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    if path.is_empty() {
        return None;
    }
    Pointer(path)
        .segments()
        .try_fold(document, |value, segment| match value {
            serde_json::Value::Object(map) => map.get(segment),
            serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Pointer<'a>(pub &'a str);

impl<'a> Pointer<'a> {
    pub(crate) fn segments(self) -> impl Iterator<Item = &'a str> {
        self.0
            .split('.')
            .take(if self.0.is_empty() { 0 } else { usize::MAX })
    }

    pub(crate) fn split_last(self) -> Option<(Self, &'a str)> {
        if self.0.is_empty() {
            None
        } else if let Some((parent, last_segment)) = self.0.rsplit_once('.') {
            Some((Self(parent), last_segment))
        } else {
            Some((Self(""), self.0))
        }
    }

    pub(crate) fn join(self, suffix: &str) -> String {
        if suffix.is_empty() {
            self.0.to_owned()
        } else if self.0.is_empty() {
            suffix.to_owned()
        } else {
            format!("{}.{suffix}", self.0)
        }
    }
}

/// Inserts `value` into `document` at the specified path, creating intermediate objects.
/// Non-object intermediate values are replaced with objects.
pub(crate) fn insert_at(document: &mut JsonObject, path: &str, value: serde_json::Value) {
    let Some((parent, last_segment)) = Pointer(path).split_last() else {
        return;
    };
    let mut target = document;
    for segment in parent.segments() {
        let child = target
            .entry(segment.to_owned())
            .or_insert_with(|| JsonObject::new().into());
        if !child.is_object() {
            *child = JsonObject::new().into();
        }
        let serde_json::Value::Object(child) = child else {
            unreachable!(); // guaranteed by the check above
        };
        target = child;
    }
    target.insert(last_segment.to_owned(), value);
}

/// # Panics
///
/// Panics if serializing `value` to the JSON object model fails.
#[doc(hidden)] // used by the `document!` macro
pub fn insert_serialized(document: &mut JsonObject, path: &str, value: impl serde::Serialize) {
    let value = serde_json::to_value(value).expect("failed serializing inserted value");
    insert_at(document, path, value);
}
