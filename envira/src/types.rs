//! Type descriptors
//!
//! A [`TypeDesc`] is the declared type of a configuration field. The
//! conversion engine dispatches on its [`Shape`], the unparameterized outer
//! form of the descriptor (`List` for "list of int", `Union` for
//! "optional string").

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::value::{EnumValue, Value};

/// Declared type of a configuration field.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    /// Plain string, passed through unchanged
    Str,
    /// Integer, parsed as `i128` and narrowed by the typed field
    Int,
    /// Floating point number (`f64`)
    Float,
    /// Boolean (`true`/`yes`/`1`, `false`/`no`/`0`)
    Bool,
    /// The null type, matching an absent value or `none`/`null`
    Null,
    /// Calendar date-time, from a Unix timestamp or ISO-8601 text
    DateTime,
    /// Any of the alternatives, tried in declared order
    Union(Vec<TypeDesc>),
    /// `;`-separated list; elements default to `Str`
    List(Option<Box<TypeDesc>>),
    /// `,`-separated `KEY=VALUE` entries; key and value default to `Str`
    Map(Option<Box<(TypeDesc, TypeDesc)>>),
    /// One of a fixed set of literal values
    Literal(Vec<Value>),
    /// Enumerated type, constructed from a variant's textual value
    Enum(Arc<EnumType>),
    /// Caller-defined shape, handled by a registered converter
    Named {
        /// Tag used for dispatch
        name: Cow<'static, str>,
        /// Type parameters
        args: Vec<TypeDesc>,
    },
}

impl TypeDesc {
    /// `Union[inner, Null]`.
    ///
    /// An inner union is flattened, and `Null` is not added twice.
    pub fn optional(inner: TypeDesc) -> Self {
        let mut alternatives = match inner {
            Self::Union(alternatives) => alternatives,
            other => vec![other],
        };
        if !alternatives.contains(&Self::Null) {
            alternatives.push(Self::Null);
        }
        Self::Union(alternatives)
    }

    /// Union of the given alternatives, in order.
    pub fn union(alternatives: impl IntoIterator<Item = TypeDesc>) -> Self {
        Self::Union(alternatives.into_iter().collect())
    }

    /// List with the given element type.
    pub fn list_of(element: TypeDesc) -> Self {
        Self::List(Some(Box::new(element)))
    }

    /// Mapping with the given key and value types.
    pub fn map_of(key: TypeDesc, value: TypeDesc) -> Self {
        Self::Map(Some(Box::new((key, value))))
    }

    /// Literal constraint over the given values.
    pub fn literal<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    /// Caller-defined shape without parameters.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Outer form of this descriptor, used as the dispatch key.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Str => Shape::Str,
            Self::Int => Shape::Int,
            Self::Float => Shape::Float,
            Self::Bool => Shape::Bool,
            Self::Null => Shape::Null,
            Self::DateTime => Shape::DateTime,
            Self::Union(_) => Shape::Union,
            Self::List(_) => Shape::List,
            Self::Map(_) => Shape::Map,
            Self::Literal(_) => Shape::Literal,
            Self::Enum(_) => Shape::Enum,
            Self::Named { name, .. } => Shape::Named(name.clone()),
        }
    }

    /// Type parameters of a parameterized descriptor.
    ///
    /// Untyped lists and maps report no parameters.
    pub fn args(&self) -> Vec<&TypeDesc> {
        match self {
            Self::Union(alternatives) => alternatives.iter().collect(),
            Self::List(Some(element)) => vec![element.as_ref()],
            Self::Map(Some(pair)) => vec![&pair.0, &pair.1],
            Self::Named { args, .. } => args.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Construct a value by calling this type on the raw text.
    ///
    /// Used when no registered converter claims the type. Only scalar
    /// numeric types and enumerations know how to construct themselves.
    pub fn construct(&self, raw: Option<&str>) -> Result<Value, ConversionError> {
        let Some(raw) = raw else {
            return Err(ConversionError::type_cast(self, "no value to construct from"));
        };
        match self {
            Self::Int => raw
                .parse::<i128>()
                .map(Value::Int)
                .map_err(|e| ConversionError::type_cast(self, e)),
            Self::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| ConversionError::type_cast(self, e)),
            Self::Enum(ty) => ty
                .lookup(raw)
                .and_then(|index| EnumValue::new(ty.clone(), index))
                .map(Value::Enum)
                .ok_or_else(|| {
                    ConversionError::type_cast(self, format!("'{raw}' is not a valid {}", ty.name()))
                }),
            _ => Err(ConversionError::type_cast(self, "no converter registered")),
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => f.write_str("string"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Null => f.write_str("null"),
            Self::DateTime => f.write_str("datetime"),
            Self::Union(alternatives) => {
                f.write_str("union<")?;
                write_joined(f, alternatives, " | ")?;
                f.write_str(">")
            }
            Self::List(None) => f.write_str("list"),
            Self::List(Some(element)) => write!(f, "list<{element}>"),
            Self::Map(None) => f.write_str("map"),
            Self::Map(Some(pair)) => write!(f, "map<{}, {}>", pair.0, pair.1),
            Self::Literal(values) => {
                f.write_str("literal[")?;
                write_joined(f, values, ", ")?;
                f.write_str("]")
            }
            Self::Enum(ty) => f.write_str(ty.name()),
            Self::Named { name, args } if args.is_empty() => f.write_str(name),
            Self::Named { name, args } => {
                write!(f, "{name}<")?;
                write_joined(f, args, ", ")?;
                f.write_str(">")
            }
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Unparameterized outer form of a [`TypeDesc`].
///
/// Shapes double as registry tags: a converter registered under a shape is
/// selected, by default, for every descriptor of that shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Union,
    Str,
    Null,
    List,
    Map,
    DateTime,
    Bool,
    Literal,
    Int,
    Float,
    Enum,
    Named(Cow<'static, str>),
}

impl Shape {
    /// Tag for a caller-defined shape.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named(name.into())
    }
}

/// An enumerated type: a name and its ordered `(variant, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    variants: Vec<(String, String)>,
}

impl EnumType {
    /// Create an enumerated type from `(variant name, textual value)` pairs.
    pub fn new<N, V>(name: impl Into<String>, variants: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variant names, in declared order.
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(name, _)| name.as_str())
    }

    pub fn variant_name(&self, index: usize) -> Option<&str> {
        self.variants.get(index).map(|(name, _)| name.as_str())
    }

    pub fn variant_value(&self, index: usize) -> Option<&str> {
        self.variants.get(index).map(|(_, value)| value.as_str())
    }

    /// Index of the first variant whose textual value equals `raw`.
    pub fn lookup(&self, raw: &str) -> Option<usize> {
        self.variants.iter().position(|(_, value)| value == raw)
    }
}

impl From<EnumType> for TypeDesc {
    fn from(ty: EnumType) -> Self {
        Self::Enum(Arc::new(ty))
    }
}
