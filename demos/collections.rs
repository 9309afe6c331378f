//! Example demonstrating lists, maps, enums, literals and date-times

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use envira::{EnvConfig, EnvEnum, TypeDesc};

#[derive(Debug, EnvEnum)]
enum Environment {
    #[envira(value = "dev")]
    Development,
    #[envira(value = "prod")]
    Production,
}

#[derive(Debug, EnvConfig)]
struct Config {
    // `;`-separated list: TAGS=production;api;v2
    pub tags: Vec<String>,

    // Typed list: PORTS=80;443
    pub ports: Vec<u16>,

    // `,`-separated KEY=VALUE entries: LIMITS=cpu=0.5,memory=512
    pub limits: HashMap<String, f64>,

    // Enumerated value matched by its textual value: ENVIRONMENT=prod
    pub environment: Environment,

    // Literal constraint: LOG_LEVEL must be one of the listed values
    #[envira(ty = TypeDesc::literal(["DEBUG", "INFO", "WARN", "ERROR"]))]
    pub log_level: String,

    // ISO-8601 or Unix timestamp: DEPLOYED_AT=1700394203.023535
    pub deployed_at: DateTime<Utc>,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("TAGS", "production;api;v2");
    std::env::set_var("PORTS", "80;443");
    std::env::set_var("LIMITS", "cpu=0.5,memory=512");
    std::env::set_var("ENVIRONMENT", "prod");
    std::env::set_var("LOG_LEVEL", "INFO");
    std::env::set_var("DEPLOYED_AT", "1700394203.023535");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Tags: {:?}", config.tags);
    println!("  Ports: {:?}", config.ports);
    println!("  Limits: {:?}", config.limits);
    println!("  Environment: {:?}", config.environment);
    println!("  Log level: {}", config.log_level);
    println!("  Deployed at: {}", config.deployed_at);

    // Values outside the literal set are rejected
    std::env::set_var("LOG_LEVEL", "TRACE");
    if let Err(e) = Config::from_env() {
        println!("Rejected: {e}");
    }

    Ok(())
}
