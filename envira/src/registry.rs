//! Converter registry and dispatch
//!
//! A [`Registry`] is an ordered table of `(tag, detector, converter)`
//! entries. [`Registry::convert`] asks each detector in turn whether it
//! claims the declared type; the first one that does decides the result.
//! When none does, the declared type constructs itself from the raw text
//! (see [`TypeDesc::construct`]).
//!
//! # Example
//!
//! ```rust
//! use envira::{ConversionError, Registry, Shape, TypeDesc, Value};
//!
//! let mut registry = Registry::default();
//! registry.register(Shape::named("seconds"), |raw, _ty, _registry| {
//!     let raw = raw.ok_or(ConversionError::AbsentValue)?;
//!     let secs = raw.trim_end_matches('s').parse::<i128>().map_err(ConversionError::custom)?;
//!     Ok(Value::Int(secs))
//! });
//!
//! let value = registry.convert(Some("30s"), &TypeDesc::named("seconds")).unwrap();
//! assert_eq!(value, Value::Int(30));
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::convert;
use crate::error::ConversionError;
use crate::types::{Shape, TypeDesc};
use crate::value::Value;

/// Decides whether a converter applies: `(tag, declared type, raw value)`.
pub type Detector = Arc<dyn Fn(&Shape, &TypeDesc, Option<&str>) -> bool + Send + Sync>;

/// Converts a raw value into the declared type.
///
/// The registry is passed along so that converters for compound types can
/// convert their parts recursively.
pub type Converter =
    Arc<dyn Fn(Option<&str>, &TypeDesc, &Registry) -> Result<Value, ConversionError> + Send + Sync>;

/// Default detector: the declared type's shape equals the tag.
pub fn is_shape(tag: &Shape, ty: &TypeDesc, _raw: Option<&str>) -> bool {
    ty.shape() == *tag
}

#[derive(Clone)]
struct Entry {
    tag: Shape,
    detector: Detector,
    converter: Converter,
}

/// Ordered table of converters.
///
/// Cloning is cheap; entries are shared until replaced. A clone is fully
/// independent for registration purposes.
#[derive(Clone)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// A registry without any converter. Every conversion falls back to
    /// type construction.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A registry holding the built-in converters.
    ///
    /// Order: union, string, null, list, map, date-time, bool, literal.
    /// Unions come first so that `Optional[str]` is never claimed by the
    /// string converter.
    pub fn builtin() -> Self {
        Self::empty()
            .with(Shape::Union, convert::union)
            .with(Shape::Str, convert::string)
            .with(Shape::Null, convert::null)
            .with(Shape::List, convert::list)
            .with(Shape::Map, convert::map)
            .with(Shape::DateTime, convert::datetime)
            .with(Shape::Bool, convert::boolean)
            .with(Shape::Literal, convert::literal)
    }

    /// Register a converter selected by [`is_shape`].
    ///
    /// Registering a tag that is already present replaces that entry and
    /// keeps its position.
    pub fn register<F>(&mut self, tag: Shape, converter: F) -> &mut Self
    where
        F: Fn(Option<&str>, &TypeDesc, &Registry) -> Result<Value, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        self.register_with_detector(tag, is_shape, converter)
    }

    /// Register a converter with a custom detector.
    pub fn register_with_detector<D, F>(&mut self, tag: Shape, detector: D, converter: F) -> &mut Self
    where
        D: Fn(&Shape, &TypeDesc, Option<&str>) -> bool + Send + Sync + 'static,
        F: Fn(Option<&str>, &TypeDesc, &Registry) -> Result<Value, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        let entry = Entry {
            tag,
            detector: Arc::new(detector),
            converter: Arc::new(converter),
        };
        match self.entries.iter_mut().find(|e| e.tag == entry.tag) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, tag: Shape, converter: F) -> Self
    where
        F: Fn(Option<&str>, &TypeDesc, &Registry) -> Result<Value, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        self.register(tag, converter);
        self
    }

    /// Remove the converter registered under `tag`.
    pub fn unregister(&mut self, tag: &Shape) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.tag != *tag);
        self.entries.len() != before
    }

    pub fn contains(&self, tag: &Shape) -> bool {
        self.entries.iter().any(|e| e.tag == *tag)
    }

    /// Registered tags, in precedence order.
    pub fn tags(&self) -> impl Iterator<Item = &Shape> {
        self.entries.iter().map(|e| &e.tag)
    }

    /// Convert a raw value into the declared type.
    pub fn convert(&self, raw: Option<&str>, ty: &TypeDesc) -> Result<Value, ConversionError> {
        for entry in &self.entries {
            if (entry.detector)(&entry.tag, ty, raw) {
                trace!(tag = ?entry.tag, ty = %ty, present = raw.is_some(), "Dispatching converter");
                return (entry.converter)(raw, ty, self);
            }
        }
        trace!(ty = %ty, present = raw.is_some(), "No converter matched, constructing type");
        ty.construct(raw)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("tags", &self.tags().collect::<Vec<_>>())
            .finish()
    }
}
