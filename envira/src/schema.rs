//! Runtime schemas
//!
//! A [`Schema`] declares configuration fields at runtime, as an ordered list
//! of layers from base to derived. Deriving a schema from another copies the
//! parent's layers and converter registry; declarations and registrations on
//! the child never reach the parent or its other children.
//!
//! ```rust
//! use envira::{Schema, Snapshot, TypeDesc, Value};
//!
//! let base = Schema::new("Base")
//!     .field("HOST", TypeDesc::Str)
//!     .field_with_default("PORT", TypeDesc::Int, 8080);
//! let app = base
//!     .extend("App")
//!     .field("WORKERS", TypeDesc::list_of(TypeDesc::Int));
//!
//! let snapshot: Snapshot = [("APP_HOST", "localhost"), ("APP_WORKERS", "1;2")]
//!     .into_iter()
//!     .collect();
//! let instance = app.load_from(&snapshot, "APP_").unwrap();
//!
//! assert_eq!(instance.get("PORT"), Some(&Value::Int(8080)));
//! assert_eq!(instance.to_string(), "App(HOST=localhost, PORT=8080, WORKERS=[1, 2])");
//! ```

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::de::{self, EnvValue};
use crate::env::Snapshot;
use crate::error::{ConversionError, EnvError};
use crate::registry::Registry;
use crate::types::TypeDesc;
use crate::value::Value;

/// A declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    ty: TypeDesc,
    default: Option<Value>,
    class_level: bool,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    /// Preset value, kept when the environment variable is not set.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the field is shared metadata rather than per-instance.
    pub fn is_class_level(&self) -> bool {
        self.class_level
    }
}

#[derive(Debug, Clone)]
struct Layer {
    name: String,
    fields: Vec<Field>,
}

/// Configuration type declared at runtime.
#[derive(Debug, Clone)]
pub struct Schema {
    layers: Vec<Layer>,
    registry: Registry,
}

impl Schema {
    /// A new root schema with the built-in converters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            layers: vec![Layer {
                name: name.into(),
                fields: Vec::new(),
            }],
            registry: Registry::builtin(),
        }
    }

    /// Derive a child schema.
    ///
    /// The child starts with a copy of this schema's registry, taken now.
    pub fn extend(&self, name: impl Into<String>) -> Self {
        let mut layers = self.layers.clone();
        layers.push(Layer {
            name: name.into(),
            fields: Vec::new(),
        });
        Self {
            layers,
            registry: self.registry.clone(),
        }
    }

    /// Name of the most derived layer.
    pub fn name(&self) -> &str {
        self.layers.last().map(|l| l.name.as_str()).unwrap_or_default()
    }

    /// Declare a field without a default.
    pub fn field(self, name: impl Into<String>, ty: TypeDesc) -> Self {
        self.declare(name.into(), ty, None, false)
    }

    /// Declare a field with a preset value.
    pub fn field_with_default(self, name: impl Into<String>, ty: TypeDesc, default: impl Into<Value>) -> Self {
        self.declare(name.into(), ty, Some(default.into()), false)
    }

    /// Declare class-level metadata. It is skipped when loading.
    pub fn class_var(self, name: impl Into<String>, ty: TypeDesc, value: impl Into<Value>) -> Self {
        self.declare(name.into(), ty, Some(value.into()), true)
    }

    fn declare(mut self, name: String, ty: TypeDesc, default: Option<Value>, class_level: bool) -> Self {
        if let Some(layer) = self.layers.last_mut() {
            let field = Field {
                name,
                ty,
                default,
                class_level,
            };
            match layer.fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field,
                None => layer.fields.push(field),
            }
        }
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registry of this schema, for adding converters.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Merge all layers, base first, with later declarations of a name
    /// replacing earlier ones in place.
    fn merged(&self) -> Vec<&Field> {
        let mut merged: Vec<&Field> = Vec::new();
        for field in self.layers.iter().flat_map(|l| l.fields.iter()) {
            match merged.iter_mut().find(|f| f.name == field.name) {
                Some(slot) => *slot = field,
                None => merged.push(field),
            }
        }
        merged
    }

    /// Per-instance fields, in declaration order.
    pub fn resolve(&self) -> Vec<&Field> {
        self.merged().into_iter().filter(|f| !f.class_level).collect()
    }

    /// Value of a class-level field.
    pub fn class_value(&self, name: &str) -> Option<&Value> {
        self.merged()
            .into_iter()
            .find(|f| f.class_level && f.name == name)
            .and_then(|f| f.default.as_ref())
    }

    /// Load an instance from the current process environment.
    pub fn load(&self, prefix: &str) -> Result<Instance, EnvError> {
        self.load_from(&Snapshot::capture(), prefix)
    }

    /// Load an instance from a snapshot.
    ///
    /// # Errors
    ///
    /// The first field whose value cannot be converted aborts loading.
    pub fn load_from(&self, snapshot: &Snapshot, prefix: &str) -> Result<Instance, EnvError> {
        let mut values = Vec::new();
        for field in self.resolve() {
            let key = format!("{prefix}{}", field.name);
            let preset = field.default.as_ref().filter(|v| !v.is_null());
            let value = match de::load_value(snapshot, &key, &field.ty, &self.registry, preset.is_some())? {
                Some(value) => value,
                None => preset.cloned().unwrap_or(Value::Null),
            };
            values.push((field.name.clone(), value));
        }
        debug!(schema = self.name(), fields = values.len(), "Loaded configuration");
        Ok(Instance {
            name: self.name().to_string(),
            values,
        })
    }
}

/// A loaded configuration: every resolved field with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    name: String,
    values: Vec<(String, Value)>,
}

impl Instance {
    /// Build an instance from already converted values.
    pub fn new(name: impl Into<String>, values: Vec<(String, Value)>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    /// Typed access to a field.
    pub fn get_as<T: EnvValue>(&self, field: &str) -> Result<T, ConversionError> {
        let value = self.get(field).cloned().unwrap_or(Value::Null);
        T::from_value(value)
    }

    /// Field names and values, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, value: Value) {
        self.values.push((field.into(), value));
    }

    /// Append the fields of another instance.
    pub fn merge(&mut self, other: Instance) {
        self.values.extend(other.values);
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| {
                    let json = serde_json::to_value(v).unwrap_or(serde_json::Value::Null);
                    (k.clone(), json)
                })
                .collect(),
        )
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (k, v)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str(")")
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shape;

    fn snapshot(pairs: &[(&str, &str)]) -> Snapshot {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_int() {
        let schema = Schema::new("MyEnv").field("A", TypeDesc::Int);
        let instance = schema.load_from(&snapshot(&[("A", "123")]), "").unwrap();
        assert_eq!(instance.get("A"), Some(&Value::Int(123)));
    }

    #[test]
    fn test_missing_string_fails() {
        let schema = Schema::new("MyEnv").field("A", TypeDesc::Str);
        let err = schema.load_from(&Snapshot::default(), "").unwrap_err();
        match err {
            EnvError::Conversion { name, source, .. } => {
                assert_eq!(name, "A");
                assert_eq!(source, ConversionError::AbsentValue);
            }
            other => panic!("Expected Conversion error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_kept_when_unset() {
        let schema = Schema::new("MyEnv").field_with_default("A", TypeDesc::Int, 654);
        let instance = schema.load_from(&Snapshot::default(), "").unwrap();
        assert_eq!(instance.get("A"), Some(&Value::Int(654)));

        let instance = schema.load_from(&snapshot(&[("A", "7")]), "").unwrap();
        assert_eq!(instance.get("A"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_default_is_not_converted() {
        // The preset is kept as is even though the declared type is a string.
        let schema = Schema::new("MyEnv").field_with_default("A", TypeDesc::Str, 5);
        let instance = schema.load_from(&Snapshot::default(), "").unwrap();
        assert_eq!(instance.get("A"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_null_default_is_no_preset() {
        let schema = Schema::new("MyEnv")
            .field_with_default("A", TypeDesc::optional(TypeDesc::Int), Value::Null)
            .field_with_default("B", TypeDesc::Bool, Value::Null);
        let instance = schema.load_from(&Snapshot::default(), "").unwrap();
        assert_eq!(instance.get("A"), Some(&Value::Null));
        assert_eq!(instance.get("B"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_prefix() {
        let schema = Schema::new("MyEnv").field("A", TypeDesc::Int);
        let snapshot = snapshot(&[("APP_A", "65"), ("A", "1")]);
        let instance = schema.load_from(&snapshot, "APP_").unwrap();
        assert_eq!(instance.get("A"), Some(&Value::Int(65)));
    }

    #[test]
    fn test_descendant_overrides_type_and_keeps_position() {
        let base = Schema::new("Base")
            .field("A", TypeDesc::Str)
            .field("B", TypeDesc::Str);
        let child = base.extend("Child").field("A", TypeDesc::Int).field("C", TypeDesc::Bool);

        let names: Vec<_> = child.resolve().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(child.resolve()[0].ty(), &TypeDesc::Int);
        assert_eq!(base.resolve()[0].ty(), &TypeDesc::Str);
    }

    #[test]
    fn test_class_level_fields_are_skipped() {
        let schema = Schema::new("MyEnv")
            .class_var("VERSION", TypeDesc::Str, "1.0")
            .field("A", TypeDesc::Int);
        let names: Vec<_> = schema.resolve().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, ["A"]);
        assert_eq!(schema.class_value("VERSION"), Some(&Value::from("1.0")));

        // A malformed VERSION variable is never read.
        let instance = schema
            .load_from(&snapshot(&[("A", "1"), ("VERSION", "x")]), "")
            .unwrap();
        assert_eq!(instance.len(), 1);
    }

    #[test]
    fn test_child_can_turn_class_var_into_field() {
        let base = Schema::new("Base").class_var("A", TypeDesc::Int, 1);
        let child = base.extend("Child").field("A", TypeDesc::Int);
        assert!(base.resolve().is_empty());
        assert_eq!(child.resolve().len(), 1);
    }

    #[test]
    fn test_registration_does_not_leak_to_siblings() {
        let base = Schema::new("Base").field("D", TypeDesc::named("duration"));
        let mut left = base.extend("Left");
        let right = base.extend("Right");
        left.registry_mut()
            .register(Shape::named("duration"), |raw, _, _| {
                let raw = raw.ok_or(ConversionError::AbsentValue)?;
                raw.trim_end_matches('s')
                    .parse::<i128>()
                    .map(Value::Int)
                    .map_err(ConversionError::custom)
            });

        let snapshot = snapshot(&[("D", "30s")]);
        assert_eq!(
            left.load_from(&snapshot, "").unwrap().get("D"),
            Some(&Value::Int(30))
        );
        assert!(right.load_from(&snapshot, "").is_err());
        assert!(base.load_from(&snapshot, "").is_err());
        assert!(!base.registry().contains(&Shape::named("duration")));
    }

    #[test]
    fn test_registration_before_extend_is_inherited() {
        let mut base = Schema::new("Base").field("D", TypeDesc::named("upper"));
        base.registry_mut().register(Shape::named("upper"), |raw, _, _| {
            Ok(Value::Str(raw.unwrap_or_default().to_uppercase()))
        });
        let child = base.extend("Child");

        let instance = child.load_from(&snapshot(&[("D", "abc")]), "").unwrap();
        assert_eq!(instance.get("D"), Some(&Value::from("ABC")));
    }

    #[test]
    fn test_display_lists_all_fields() {
        let base = Schema::new("Base").field("A", TypeDesc::Int);
        let child = base.extend("Child").field("B", TypeDesc::List(None));
        let instance = child
            .load_from(&snapshot(&[("A", "1"), ("B", "x;y")]), "")
            .unwrap();
        assert_eq!(instance.to_string(), "Child(A=1, B=[x, y])");
    }

    #[test]
    fn test_get_as_and_json() {
        let schema = Schema::new("MyEnv")
            .field("PORT", TypeDesc::Int)
            .field("TAGS", TypeDesc::List(None));
        let instance = schema
            .load_from(&snapshot(&[("PORT", "8080"), ("TAGS", "a;b")]), "")
            .unwrap();

        let port: u16 = instance.get_as("PORT").unwrap();
        assert_eq!(port, 8080);
        let tags: Vec<String> = instance.get_as("TAGS").unwrap();
        assert_eq!(tags, ["a", "b"]);
        assert_eq!(
            instance.to_json(),
            serde_json::json!({ "PORT": 8080, "TAGS": ["a", "b"] })
        );
    }
}
