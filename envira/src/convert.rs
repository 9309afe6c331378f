//! Built-in converters
//!
//! Each function here has the [`Converter`](crate::Converter) signature and is
//! registered by [`Registry::builtin`]. They are public so that a custom
//! registry can reuse them under other tags.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::trace;

use crate::error::ConversionError;
use crate::registry::Registry;
use crate::types::TypeDesc;
use crate::value::Value;

const LIST_SEPARATOR: char = ';';
const ENTRY_SEPARATOR: char = ',';
const KEY_VALUE_SEPARATOR: char = '=';

/// Absent, or case-insensitively `none` / `null`.
fn is_null_text(raw: Option<&str>) -> bool {
    raw.is_none_or(|r| r.eq_ignore_ascii_case("none") || r.eq_ignore_ascii_case("null"))
}

fn require(raw: Option<&str>) -> Result<&str, ConversionError> {
    raw.ok_or(ConversionError::AbsentValue)
}

fn unexpected_type(expected: &str, ty: &TypeDesc) -> ConversionError {
    ConversionError::unexpected(expected, ty.to_string())
}

/// Union: the first alternative that converts wins.
///
/// A union that admits null returns null straight away for an absent value
/// or `none`/`null` text, before any other alternative is tried.
pub fn union(raw: Option<&str>, ty: &TypeDesc, registry: &Registry) -> Result<Value, ConversionError> {
    let TypeDesc::Union(alternatives) = ty else {
        return Err(unexpected_type("union", ty));
    };

    if alternatives.contains(&TypeDesc::Null) && is_null_text(raw) {
        return Ok(Value::Null);
    }

    for alternative in alternatives {
        match registry.convert(raw, alternative) {
            Ok(value) => return Ok(value),
            Err(e) => trace!(alternative = %alternative, reason = e.reason(), "Union alternative rejected"),
        }
    }
    Err(ConversionError::NotInAllowedTypes)
}

/// String: the raw value, unchanged.
pub fn string(raw: Option<&str>, _ty: &TypeDesc, _registry: &Registry) -> Result<Value, ConversionError> {
    require(raw).map(|r| Value::Str(r.to_string()))
}

/// Null: absent, `none` or `null`.
pub fn null(raw: Option<&str>, _ty: &TypeDesc, _registry: &Registry) -> Result<Value, ConversionError> {
    if is_null_text(raw) {
        Ok(Value::Null)
    } else {
        Err(ConversionError::InvalidNull)
    }
}

/// List: `;`-separated elements, each converted with the element type.
pub fn list(raw: Option<&str>, ty: &TypeDesc, registry: &Registry) -> Result<Value, ConversionError> {
    let raw = require(raw)?;
    let element = match ty {
        TypeDesc::List(Some(element)) => element.as_ref(),
        TypeDesc::List(None) => &TypeDesc::Str,
        _ => return Err(unexpected_type("list", ty)),
    };

    raw.split(LIST_SEPARATOR)
        .map(|item| registry.convert(Some(item), element))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Mapping: `,`-separated `KEY=VALUE` entries.
///
/// Each entry is split at its first `=`. A repeated key overwrites the
/// earlier value.
pub fn map(raw: Option<&str>, ty: &TypeDesc, registry: &Registry) -> Result<Value, ConversionError> {
    let raw = require(raw)?;
    let (key_type, value_type) = match ty {
        TypeDesc::Map(Some(pair)) => (&pair.0, &pair.1),
        TypeDesc::Map(None) => (&TypeDesc::Str, &TypeDesc::Str),
        _ => return Err(unexpected_type("map", ty)),
    };

    let mut entries: Vec<(Value, Value)> = Vec::new();
    for entry in raw.split(ENTRY_SEPARATOR) {
        let (k, v) = entry
            .split_once(KEY_VALUE_SEPARATOR)
            .ok_or_else(|| ConversionError::MalformedEntry {
                entry: entry.to_string(),
            })?;
        let key = registry.convert(Some(k), key_type)?;
        let value = registry.convert(Some(v), value_type)?;
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }
    Ok(Value::Map(entries))
}

/// Date-time: a Unix timestamp if the text is only digits and dots,
/// ISO-8601 otherwise.
pub fn datetime(raw: Option<&str>, _ty: &TypeDesc, _registry: &Registry) -> Result<Value, ConversionError> {
    let raw = require(raw)?;
    let parsed = if raw.chars().all(|c| c.is_ascii_digit() || c == '.') {
        parse_timestamp(raw)
    } else {
        parse_iso8601(raw)
    };
    parsed.map(Value::DateTime).map_err(|message| ConversionError::InvalidDateTime {
        input: raw.to_string(),
        message,
    })
}

/// Bool: `true`/`yes`/`1` or `false`/`no`/`0`, any case. Absent is false.
pub fn boolean(raw: Option<&str>, _ty: &TypeDesc, _registry: &Registry) -> Result<Value, ConversionError> {
    let Some(raw) = raw else {
        return Ok(Value::Bool(false));
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(Value::Bool(true)),
        "false" | "no" | "0" => Ok(Value::Bool(false)),
        _ => Err(ConversionError::InvalidBool),
    }
}

/// Literal: convert with each allowed value's own type and compare.
pub fn literal(raw: Option<&str>, ty: &TypeDesc, registry: &Registry) -> Result<Value, ConversionError> {
    let TypeDesc::Literal(allowed) = ty else {
        return Err(unexpected_type("literal", ty));
    };

    for candidate in allowed {
        match registry.convert(raw, &candidate.type_desc()) {
            Ok(value) if value == *candidate => return Ok(value),
            Ok(_) => {}
            Err(e) => trace!(candidate = %candidate, reason = e.reason(), "Literal candidate rejected"),
        }
    }
    Err(ConversionError::NotInAllowedValues)
}

/// Seconds since the Unix epoch, with an optional fraction kept to
/// nanosecond precision.
fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    let (secs, frac) = raw.split_once('.').unwrap_or((raw, ""));
    if frac.contains('.') || (secs.is_empty() && frac.is_empty()) {
        return Err("invalid timestamp".to_string());
    }

    let secs: i64 = if secs.is_empty() {
        0
    } else {
        secs.parse().map_err(|e| format!("invalid timestamp: {e}"))?
    };
    let nanos = frac
        .chars()
        .chain(std::iter::repeat('0'))
        .take(9)
        .collect::<String>()
        .parse::<u32>()
        .map_err(|e| format!("invalid timestamp fraction: {e}"))?;

    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| "timestamp out of range".to_string())
}

// `%#z` also accepts `Z` and offsets without minutes.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// ISO-8601 date-time. Inputs without an offset are taken as UTC; a bare
/// date means midnight.
fn parse_iso8601(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Ok(dt);
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Ok(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        .map_err(|e| format!("not an ISO-8601 date-time: {e}"))
}
