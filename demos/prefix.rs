//! Example demonstrating prefix attribute

use envira::EnvConfig;

#[derive(Debug, EnvConfig)]
#[envira(prefix = "MYAPP_")]
struct Config {
    // Environment variables will be prefixed: MYAPP_DATABASE_URL, MYAPP_API_KEY, etc.
    pub database_url: String,
    pub api_key: String,

    #[envira(default = 8080)]
    pub port: u16,

    #[envira(default)]
    pub debug: bool,
}

fn main() -> anyhow::Result<()> {
    // Set environment variables with prefix
    std::env::set_var("MYAPP_DATABASE_URL", "postgres://localhost/db");
    std::env::set_var("MYAPP_API_KEY", "secret-key-123");
    std::env::set_var("MYAPP_PORT", "3000");

    let config = Config::from_env()?;

    println!("Configuration with prefix 'MYAPP_':");
    println!("  Database URL: {}", config.database_url);
    println!("  API Key: {}", config.api_key);
    println!("  Port: {}", config.port);
    println!("  Debug: {}", config.debug);

    // The same struct can be loaded under another prefix
    std::env::set_var("STAGING_DATABASE_URL", "postgres://staging/db");
    std::env::set_var("STAGING_API_KEY", "staging-key");

    let staging = Config::from_env_with_prefix("STAGING_")?;
    println!("Staging: {}", staging.describe());

    Ok(())
}
