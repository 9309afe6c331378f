//! Error types for environment variable binding

/// Errors raised by the conversion engine.
///
/// Every converter reports failure through this type. Union and literal
/// converters treat an inner failure as "try the next alternative", so a
/// `ConversionError` only reaches the caller once every option is exhausted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// The raw value was absent but the target type requires text.
    #[error("did not expect an absent value")]
    AbsentValue,

    /// Text could not be read as the null value.
    #[error("could not parse null type")]
    InvalidNull,

    /// Text is not one of the accepted boolean spellings.
    #[error("could not parse bool")]
    InvalidBool,

    /// No alternative of a union accepted the value.
    #[error("value is not in the allowed types")]
    NotInAllowedTypes,

    /// The value converted, but did not equal any allowed literal.
    #[error("value is not in the allowed values")]
    NotInAllowedValues,

    /// Fallback construction of the declared type failed.
    #[error("could not type cast to {type_name}: {message}")]
    TypeCast {
        /// Display name of the declared type
        type_name: String,
        /// Message from the underlying parser
        message: String,
    },

    /// A mapping entry did not contain a `=` separator.
    #[error("malformed mapping entry '{entry}': expected KEY=VALUE")]
    MalformedEntry {
        /// The offending entry text
        entry: String,
    },

    /// Neither a Unix timestamp nor an ISO-8601 date-time.
    #[error("could not parse date-time '{input}': {message}")]
    InvalidDateTime {
        /// The raw input
        input: String,
        /// Message from the date-time parser
        message: String,
    },

    /// A converted value did not have the shape the caller expected.
    ///
    /// Occurs when a typed field receives a value of another kind, e.g. when
    /// a custom converter returns a string for an integer field.
    #[error("expected {expected} value, found {found}")]
    UnexpectedValue {
        /// Expected kind of value
        expected: String,
        /// Kind of the value actually produced
        found: String,
    },

    /// Failure reported by a caller-registered converter.
    #[error("{0}")]
    Custom(String),
}

impl ConversionError {
    /// Short, machine-readable reason for the failure.
    pub fn reason(&self) -> &str {
        match self {
            Self::AbsentValue => "did not expect an absent value",
            Self::InvalidNull => "could not parse null type",
            Self::InvalidBool => "could not parse bool",
            Self::NotInAllowedTypes => "value is not in the allowed types",
            Self::NotInAllowedValues => "value is not in the allowed values",
            Self::TypeCast { .. } => "could not type cast",
            Self::MalformedEntry { .. } => "malformed mapping entry",
            Self::InvalidDateTime { .. } => "could not parse date-time",
            Self::UnexpectedValue { .. } => "unexpected value type",
            Self::Custom(message) => message,
        }
    }

    /// Create a custom error (for caller-registered converters)
    pub fn custom(message: impl std::fmt::Display) -> Self {
        Self::Custom(message.to_string())
    }

    #[doc(hidden)]
    pub fn type_cast(type_name: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        Self::TypeCast {
            type_name: type_name.to_string(),
            message: message.to_string(),
        }
    }

    #[doc(hidden)]
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedValue {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Errors that can occur when constructing configuration from the environment.
///
/// Construction is all-or-nothing: the first failing field aborts it and is
/// reported here together with the environment variable it was read from.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// Failed to convert the environment variable value into the declared type.
    #[error("Failed to convert environment variable '{name}' as {type_name}: {source}")]
    Conversion {
        /// Name of the environment variable (prefix included)
        name: String,
        /// Display name of the declared type
        type_name: String,
        /// Underlying conversion failure
        source: ConversionError,
    },

    /// Environment variable is set but its value is not valid UTF-8.
    #[error("Environment variable '{name}' is not valid unicode")]
    NotUnicode {
        /// Name of the environment variable
        name: String,
    },
}

impl EnvError {
    /// Create a conversion error (used by macro-generated code)
    #[doc(hidden)]
    pub fn conversion(
        name: impl Into<String>,
        type_name: impl std::fmt::Display,
        source: ConversionError,
    ) -> Self {
        Self::Conversion {
            name: name.into(),
            type_name: type_name.to_string(),
            source,
        }
    }

    /// The conversion failure behind this error, if any.
    pub fn conversion_error(&self) -> Option<&ConversionError> {
        match self {
            Self::Conversion { source, .. } => Some(source),
            Self::NotUnicode { .. } => None,
        }
    }
}
