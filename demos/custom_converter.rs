//! Example demonstrating a custom converter registered for one configuration type

use std::time::Duration;

use envira::{ConversionError, EnvConfig, Registry, Shape, TypeDesc, Value};

/// Registry with a converter for human-friendly durations such as `30s` or `5m`.
fn duration_registry() -> Registry {
    Registry::builtin().with(Shape::named("duration"), |raw, _ty, _registry| {
        let raw = raw.ok_or(ConversionError::AbsentValue)?;
        let (digits, scale) = if let Some(hours) = raw.strip_suffix('h') {
            (hours, 3600)
        } else if let Some(minutes) = raw.strip_suffix('m') {
            (minutes, 60)
        } else {
            (raw.strip_suffix('s').unwrap_or(raw), 1)
        };
        digits
            .parse::<i128>()
            .map(|amount| Value::Int(amount * scale))
            .map_err(|e| ConversionError::custom(format!("invalid duration '{raw}': {e}")))
    })
}

#[derive(Debug, EnvConfig)]
#[envira(registry = "duration_registry")]
struct Config {
    // Converted by the "duration" converter into seconds
    #[envira(ty = TypeDesc::named("duration"))]
    pub request_timeout: u64,

    #[envira(ty = TypeDesc::named("duration"), default = 3600)]
    pub session_ttl: u64,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("REQUEST_TIMEOUT", "30s");

    let config = Config::from_env()?;
    let timeout = Duration::from_secs(config.request_timeout);
    let ttl = Duration::from_secs(config.session_ttl);

    println!("Configuration loaded:");
    println!("  Request timeout: {timeout:?}");
    println!("  Session TTL: {ttl:?}");

    Ok(())
}
