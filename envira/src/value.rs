//! Converted values

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::types::{EnumType, TypeDesc};

/// A value produced by the conversion engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Any Rust integer; `i128` holds both `i64::MIN` and `u64::MAX`
    Int(i128),
    Float(f64),
    Str(String),
    DateTime(DateTime<FixedOffset>),
    List(Vec<Value>),
    /// Ordered `(key, value)` entries with unique keys
    Map(Vec<(Value, Value)>),
    Enum(EnumValue),
}

impl Value {
    /// Runtime type of this value.
    ///
    /// Literal constraints convert the raw text with the runtime type of
    /// each allowed value before comparing.
    pub fn type_desc(&self) -> TypeDesc {
        match self {
            Self::Null => TypeDesc::Null,
            Self::Bool(_) => TypeDesc::Bool,
            Self::Int(_) => TypeDesc::Int,
            Self::Float(_) => TypeDesc::Float,
            Self::Str(_) => TypeDesc::Str,
            Self::DateTime(_) => TypeDesc::DateTime,
            Self::List(_) => TypeDesc::List(None),
            Self::Map(_) => TypeDesc::Map(None),
            Self::Enum(value) => TypeDesc::Enum(value.ty.clone()),
        }
    }

    /// Short name of this value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Enum(_) => "enum",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a key in a map value.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
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
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Self::Enum(value) => write!(f, "{value}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => match (i64::try_from(*i), u64::try_from(*i)) {
                (Ok(i), _) => serializer.serialize_i64(i),
                (_, Ok(u)) => serializer.serialize_u64(u),
                _ => serializer.serialize_i128(*i),
            },
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Str(s) => serializer.serialize_str(s),
            Self::DateTime(dt) => dt.serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            // Keys are rendered as text so that maps keyed by numbers still
            // serialize into formats with string-only keys.
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&k.to_string(), v)?;
                }
                map.end()
            }
            Self::Enum(value) => serializer.serialize_str(value.name()),
        }
    }
}

/// A variant of an [`EnumType`].
#[derive(Debug, Clone)]
pub struct EnumValue {
    ty: Arc<EnumType>,
    index: usize,
}

impl EnumValue {
    /// The variant of `ty` at `index`, or `None` if there is no such variant.
    pub fn new(ty: Arc<EnumType>, index: usize) -> Option<Self> {
        ty.variant_name(index)?;
        Some(Self { ty, index })
    }

    pub fn enum_type(&self) -> &EnumType {
        &self.ty
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Variant name.
    pub fn name(&self) -> &str {
        self.ty.variant_name(self.index).unwrap_or_default()
    }

    /// Textual value the variant is constructed from.
    pub fn value(&self) -> &str {
        self.ty.variant_value(self.index).unwrap_or_default()
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.ty.name() == other.ty.name()
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ty.name(), self.name())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i.into())
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Self::Int(u.into())
    }
}

impl From<i128> for Value {
    fn from(i: i128) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let value = Value::Map(vec![
            (Value::Int(1), Value::List(vec!["a".into(), "b".into()])),
            (Value::Int(2), Value::Null),
        ]);
        assert_eq!(value.to_string(), "{1: [a, b], 2: null}");
    }

    #[test]
    fn test_enum_display_and_eq() {
        let ty = Arc::new(EnumType::new("Level", [("Debug", "debug"), ("Info", "info")]));
        let info = EnumValue::new(ty.clone(), 1).unwrap();
        assert_eq!(info.to_string(), "Level.Info");
        assert_eq!(info.value(), "info");
        assert_eq!(Some(info), EnumValue::new(ty, 1));
    }

    #[test]
    fn test_enum_value_out_of_range() {
        let ty = Arc::new(EnumType::new("Level", [("Debug", "debug")]));
        assert_eq!(EnumValue::new(ty.clone(), 1), None);
        assert!(EnumValue::new(ty, 0).is_some());
    }

    #[test]
    fn test_serialize_map_with_int_keys() {
        let value = Value::Map(vec![(Value::Int(1), Value::Float(32.5))]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({ "1": 32.5 }));
    }

    #[test]
    fn test_serialize_wide_integers() {
        let json = serde_json::to_value(Value::from(u64::MAX)).unwrap();
        assert_eq!(json, serde_json::json!(u64::MAX));
        let json = serde_json::to_value(Value::from(i64::MIN)).unwrap();
        assert_eq!(json, serde_json::json!(i64::MIN));
    }

    #[test]
    fn test_type_desc_of_literals() {
        assert_eq!(Value::from(64).type_desc(), TypeDesc::Int);
        assert_eq!(Value::from(false).type_desc(), TypeDesc::Bool);
        assert_eq!(Value::from(None::<i64>).type_desc(), TypeDesc::Null);
    }
}
