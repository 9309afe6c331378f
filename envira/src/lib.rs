//! Declarative environment variable binding
//!
//! `envira` fills configuration fields from environment variables of the same
//! name (optionally prefixed), converting each raw string into the field's
//! declared type. Conversion is directed by a [`TypeDesc`] and performed by an
//! extensible [`Registry`] of converters.
//!
//! # Features
//!
//! - **Declarative**: Automatic implementation with `#[derive(EnvConfig)]`
//! - **Rich types**: optionals, unions, lists, maps, literals, enums, date-times
//! - **Runtime schemas**: declare fields with [`Schema`] when types are only
//!   known at runtime, including base/derived layering
//! - **Extensible**: register converters per configuration type
//! - **Default values**: Support for `Default` trait and explicit values
//!
//! # Value Parsing
//!
//! | Type | Example | Notes |
//! |---|---|---|
//! | `String` | `DATABASE_URL=postgres://localhost/db` | must be set |
//! | integers, floats | `MAX_CONNECTIONS=42` | standard number syntax |
//! | `bool` | `DEBUG=yes` | `true`/`yes`/`1`, `false`/`no`/`0`, unset is `false` |
//! | `Option<T>` | `TIMEOUT=null` | unset, `none` or `null` is `None` |
//! | `Vec<T>` | `PORTS=80;443` | `;`-separated |
//! | `HashMap<K, V>` | `LIMITS=a=1,b=2` | `,`-separated `KEY=VALUE` |
//! | date-times | `START=2023-11-19T19:43:23Z` | ISO-8601 or Unix timestamp |
//!
//! # Example
//!
//! ```rust
//! use envira::EnvConfig;
//!
//! #[derive(Debug, EnvConfig)]
//! struct Config {
//!     pub database_url: String,
//!
//!     #[envira(default = 8080)]
//!     pub port: u16,
//!
//!     pub workers: Vec<u32>,
//!
//!     pub timeout: Option<u64>,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! #     std::env::set_var("DATABASE_URL", "postgres://localhost/db");
//! #     std::env::set_var("WORKERS", "1;2;4");
//! let config = Config::from_env()?;
//! assert_eq!(config.database_url, "postgres://localhost/db");
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.workers, vec![1, 2, 4]);
//! assert_eq!(config.timeout, None);
//! #     Ok(())
//! # }
//! ```
//!
//! # Attributes
//!
//! ## `#[envira(prefix = "APP_")]`
//!
//! Struct-level prefix prepended to every environment variable name by
//! `from_env()`. `from_env_with_prefix()` overrides it.
//!
//! ## `#[envira(name = "CUSTOM_NAME")]`
//!
//! Specify an environment variable name different from the upper-cased field
//! name.
//!
//! ## `#[envira(default)]` / `#[envira(default = value)]`
//!
//! Keep `Default::default()` or the given value when the variable is not set.
//! A set variable is always converted.
//!
//! ## `#[envira(ty = expr)]`
//!
//! Declare the field's type explicitly, e.g. a literal constraint:
//!
//! ```rust
//! use envira::{EnvConfig, TypeDesc};
//!
//! #[derive(EnvConfig)]
//! struct Config {
//!     #[envira(ty = TypeDesc::literal(["DEBUG", "INFO", "WARN", "ERROR"]))]
//!     pub log_level: String,
//! }
//! ```
//!
//! ## `#[envira(flatten)]`
//!
//! Load another `EnvConfig` struct from the same variables, with the same
//! prefix and registry.
//!
//! ## `#[envira(registry = "path::to::fn")]`
//!
//! Struct-level function returning the [`Registry`] used for this type.

#[doc(hidden)]
pub mod de;

pub mod convert;
mod env;
mod error;
mod registry;
mod schema;
mod types;
mod value;

pub use de::{EnvConfig, EnvValue};
pub use env::Snapshot;
pub use envira_derive::{EnvConfig, EnvEnum};
pub use error::{ConversionError, EnvError};
pub use registry::{is_shape, Converter, Detector, Registry};
pub use schema::{Field, Instance, Schema};
pub use types::{EnumType, Shape, TypeDesc};
pub use value::{EnumValue, Value};
