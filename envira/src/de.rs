//! Typed binding of environment variables
//!
//! [`EnvValue`] connects a Rust type to its [`TypeDesc`] and converts engine
//! [`Value`]s back into it. [`EnvConfig`] is implemented by
//! `#[derive(EnvConfig)]` and loads a whole struct.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use tracing::debug;

use crate::env::Snapshot;
use crate::error::{ConversionError, EnvError};
use crate::registry::Registry;
use crate::schema::Instance;
use crate::types::TypeDesc;
use crate::value::Value;

/// A Rust type that can be bound to an environment variable.
pub trait EnvValue: Sized {
    /// Declared type used for conversion.
    fn type_desc() -> TypeDesc;

    /// Convert an engine value into this type.
    fn from_value(value: Value) -> Result<Self, ConversionError>;

    /// Convert back into an engine value, for diagnostics.
    fn to_value(&self) -> Value;
}

/// A configuration struct loaded from environment variables.
///
/// Implemented by `#[derive(EnvConfig)]`.
pub trait EnvConfig: Sized {
    /// Prefix used by [`from_env`](Self::from_env).
    const PREFIX: &'static str = "";

    /// Converters used for this type's fields.
    fn registry() -> Registry {
        Registry::builtin()
    }

    /// Load from a snapshot with an explicit registry.
    fn from_snapshot_with(snapshot: &Snapshot, prefix: &str, registry: &Registry) -> Result<Self, EnvError>;

    /// Field names and values, for diagnostics.
    fn to_instance(&self) -> Instance;

    /// Load from a snapshot using [`registry`](Self::registry).
    fn from_snapshot(snapshot: &Snapshot, prefix: &str) -> Result<Self, EnvError> {
        Self::from_snapshot_with(snapshot, prefix, &Self::registry())
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// - A field's value cannot be converted into its declared type
    /// - A required value (e.g. a string) is not set
    /// - A value is not valid unicode
    fn from_env() -> Result<Self, EnvError> {
        Self::from_env_with_prefix(Self::PREFIX)
    }

    /// Load configuration from environment variables with a prefix.
    fn from_env_with_prefix(prefix: &str) -> Result<Self, EnvError> {
        Self::from_snapshot(&Snapshot::capture(), prefix)
    }

    /// `Name(field=value, ...)`, listing declared field names
    fn describe(&self) -> String {
        self.to_instance().to_string()
    }
}

/// Read and convert one variable.
///
/// Returns `None` when the variable is unset and the caller holds a preset
/// value that should be kept. Otherwise the raw value, which may be absent,
/// is converted.
#[doc(hidden)]
pub fn load_value(
    snapshot: &Snapshot,
    key: &str,
    ty: &TypeDesc,
    registry: &Registry,
    has_preset: bool,
) -> Result<Option<Value>, EnvError> {
    let raw = snapshot.get(key)?;
    if raw.is_none() && has_preset {
        debug!(key, "Variable not set, keeping preset value");
        return Ok(None);
    }
    debug!(key, ty = %ty, present = raw.is_some(), "Converting variable");
    registry
        .convert(raw, ty)
        .map(Some)
        .map_err(|e| EnvError::conversion(key, ty, e))
}

/// Load a typed field
///
/// Used by the derive macro.
#[doc(hidden)]
pub fn load_field<T: EnvValue>(
    snapshot: &Snapshot,
    key: &str,
    ty: &TypeDesc,
    registry: &Registry,
    default: Option<T>,
) -> Result<T, EnvError> {
    match load_value(snapshot, key, ty, registry, default.is_some())? {
        Some(value) => T::from_value(value).map_err(|e| EnvError::conversion(key, ty, e)),
        None => default.ok_or_else(|| EnvError::conversion(key, ty, ConversionError::AbsentValue)),
    }
}

fn mismatch(expected: &str, value: &Value) -> ConversionError {
    ConversionError::unexpected(expected, value.kind())
}

impl EnvValue for Value {
    fn type_desc() -> TypeDesc {
        TypeDesc::Str
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl EnvValue for String {
    fn type_desc() -> TypeDesc {
        TypeDesc::Str
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl EnvValue for bool {
    fn type_desc() -> TypeDesc {
        TypeDesc::Bool
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! impl_env_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EnvValue for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::Int
                }

                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i)
                            .map_err(|e| ConversionError::type_cast(stringify!($ty), e)),
                        other => Err(mismatch("int", &other)),
                    }
                }

                fn to_value(&self) -> Value {
                    // Lossless: every listed type is at most 64 bits wide.
                    Value::Int(*self as i128)
                }
            }
        )*
    };
}

impl_env_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl EnvValue for f64 {
    fn type_desc() -> TypeDesc {
        TypeDesc::Float
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            other => Err(mismatch("float", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl EnvValue for f32 {
    fn type_desc() -> TypeDesc {
        TypeDesc::Float
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        f64::from_value(value).map(|x| x as f32)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl EnvValue for DateTime<FixedOffset> {
    fn type_desc() -> TypeDesc {
        TypeDesc::DateTime
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(mismatch("datetime", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

impl EnvValue for DateTime<Utc> {
    fn type_desc() -> TypeDesc {
        TypeDesc::DateTime
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        DateTime::<FixedOffset>::from_value(value).map(|dt| dt.with_timezone(&Utc))
    }

    fn to_value(&self) -> Value {
        Value::DateTime(self.fixed_offset())
    }
}

/// Wall-clock time in UTC.
impl EnvValue for NaiveDateTime {
    fn type_desc() -> TypeDesc {
        TypeDesc::DateTime
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        DateTime::<Utc>::from_value(value).map(|dt| dt.naive_utc())
    }

    fn to_value(&self) -> Value {
        Value::DateTime(self.and_utc().fixed_offset())
    }
}

impl<T: EnvValue> EnvValue for Option<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::optional(T::type_desc())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }
}

impl<T: EnvValue> EnvValue for Vec<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::list_of(T::type_desc())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }
}

fn map_entries<K: EnvValue, V: EnvValue>(value: Value) -> Result<Vec<(K, V)>, ConversionError> {
    match value {
        Value::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect(),
        other => Err(mismatch("map", &other)),
    }
}

impl<K, V> EnvValue for HashMap<K, V>
where
    K: EnvValue + Eq + Hash,
    V: EnvValue,
{
    fn type_desc() -> TypeDesc {
        TypeDesc::map_of(K::type_desc(), V::type_desc())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        map_entries(value).map(|entries| entries.into_iter().collect())
    }

    /// Entries are ordered by their rendered key, since hash order varies
    /// between runs.
    fn to_value(&self) -> Value {
        let mut entries: Vec<_> = self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect();
        entries.sort_by_cached_key(|(k, _)| k.to_string());
        Value::Map(entries)
    }
}

impl<K, V> EnvValue for BTreeMap<K, V>
where
    K: EnvValue + Ord,
    V: EnvValue,
{
    fn type_desc() -> TypeDesc {
        TypeDesc::map_of(K::type_desc(), V::type_desc())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        map_entries(value).map(|entries| entries.into_iter().collect())
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn load<T: EnvValue>(pairs: &[(&str, &str)], default: Option<T>) -> Result<T, EnvError> {
        let snapshot: Snapshot = pairs.iter().copied().collect();
        load_field(&snapshot, "TEST_VAR", &T::type_desc(), &Registry::builtin(), default)
    }

    #[test]
    fn test_load_required_success() {
        let value: i32 = load(&[("TEST_VAR", "42")], None).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_load_required_missing() {
        let result: Result<String, _> = load(&[], None);
        match result {
            Err(EnvError::Conversion { name, source, .. }) => {
                assert_eq!(name, "TEST_VAR");
                assert_eq!(source, ConversionError::AbsentValue);
            }
            _ => panic!("Expected Conversion error"),
        }
    }

    #[test]
    fn test_load_with_default_env_set() {
        let value: u32 = load(&[("TEST_VAR", "100")], Some(50)).unwrap();
        assert_eq!(value, 100);
    }

    #[test]
    fn test_load_with_default_use_default() {
        let value: u32 = load(&[], Some(50)).unwrap();
        assert_eq!(value, 50);
    }

    #[test]
    fn test_load_with_default_invalid_value() {
        let result: Result<u32, _> = load(&[("TEST_VAR", "fifty")], Some(50));
        assert!(result.is_err());
    }

    #[test]
    fn test_integer_out_of_range() {
        let result: Result<u8, _> = load(&[("TEST_VAR", "300")], None);
        match result {
            Err(EnvError::Conversion { source, .. }) => {
                assert_eq!(source.reason(), "could not type cast");
            }
            _ => panic!("Expected Conversion error"),
        }
    }

    #[test]
    fn test_integer_full_range() {
        let value: u64 = load(&[("TEST_VAR", "18446744073709551615")], None).unwrap();
        assert_eq!(value, u64::MAX);

        let value: i64 = load(&[("TEST_VAR", "-9223372036854775808")], None).unwrap();
        assert_eq!(value, i64::MIN);

        let result: Result<u64, _> = load(&[("TEST_VAR", "18446744073709551616")], None);
        assert!(result.is_err());
        let result: Result<u64, _> = load(&[("TEST_VAR", "-1")], None);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_optional() {
        let value: Option<String> = load(&[("TEST_VAR", "hello")], None).unwrap();
        assert_eq!(value, Some("hello".to_string()));

        let value: Option<String> = load(&[], None).unwrap();
        assert_eq!(value, None);

        let value: Option<u16> = load(&[("TEST_VAR", "NULL")], None).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_load_bool_absent_is_false() {
        let value: bool = load(&[], None).unwrap();
        assert!(!value);
    }

    #[test]
    fn test_load_collections() {
        let value: Vec<u16> = load(&[("TEST_VAR", "80;443")], None).unwrap();
        assert_eq!(value, vec![80, 443]);

        let value: HashMap<i32, f64> = load(&[("TEST_VAR", "1=32.5,7=5.63")], None).unwrap();
        assert_eq!(value, HashMap::from([(1, 32.5), (7, 5.63)]));

        let value: BTreeMap<String, Vec<String>> =
            load(&[("TEST_VAR", "a=x;y,b=z")], None).unwrap();
        assert_eq!(value["a"], ["x", "y"]);
        assert_eq!(value["b"], ["z"]);
    }

    #[test]
    fn test_load_datetime() {
        let value: DateTime<Utc> = load(&[("TEST_VAR", "1700394203")], None).unwrap();
        assert_eq!(value.timestamp(), 1700394203);

        let value: NaiveDateTime = load(&[("TEST_VAR", "2023-11-19T19:43:23")], None).unwrap();
        assert_eq!(value.to_string(), "2023-11-19 19:43:23");
    }

    #[test]
    fn test_float_accepts_int_value() {
        assert_eq!(f64::from_value(Value::Int(3)), Ok(3.0));
    }

    #[test]
    fn test_mismatched_value() {
        let err = String::from_value(Value::Int(1)).unwrap_err();
        assert_eq!(err.reason(), "unexpected value type");
    }

    #[test]
    fn test_to_value() {
        assert_eq!(Some(5u8).to_value(), Value::Int(5));
        assert_eq!(None::<u8>.to_value(), Value::Null);
        assert_eq!(
            vec!["a".to_string()].to_value(),
            Value::List(vec![Value::from("a")])
        );
        assert_eq!(u64::MAX.to_value(), Value::Int(u64::MAX.into()));
        assert_eq!(i64::MIN.to_value(), Value::Int(i64::MIN.into()));
    }

    #[test]
    fn test_hash_map_to_value_is_ordered() {
        let map: HashMap<String, i32> = ["delta", "alpha", "charlie", "bravo", "echo"]
            .into_iter()
            .enumerate()
            .map(|(i, k)| (k.to_string(), i as i32))
            .collect();

        let Value::Map(entries) = map.to_value() else {
            panic!("expected map value");
        };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["alpha", "bravo", "charlie", "delta", "echo"]);
        assert_eq!(map.to_value().to_string(), "{alpha: 1, bravo: 3, charlie: 2, delta: 0, echo: 4}");
    }

    #[test]
    #[serial]
    fn test_load_value_from_process_env() {
        env::set_var("TEST_PROCESS_VAR", "yes");
        let snapshot = Snapshot::capture();
        let value = load_value(&snapshot, "TEST_PROCESS_VAR", &TypeDesc::Bool, &Registry::builtin(), false)
            .unwrap();
        assert_eq!(value, Some(Value::Bool(true)));
        env::remove_var("TEST_PROCESS_VAR");
    }
}
