//! Example demonstrating Option<T> for optional fields

use envira::EnvConfig;

#[derive(Debug, EnvConfig)]
struct Config {
    // Required field
    pub app_name: String,

    // Optional fields - None if not set, or set to "none" / "null"
    pub api_key: Option<String>,
    pub port: Option<u16>,
    pub debug: Option<bool>,
    pub replicas: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    // Set only some environment variables
    std::env::set_var("APP_NAME", "my-application");
    std::env::set_var("PORT", "8080");
    std::env::set_var("REPLICAS", "null");
    // API_KEY, DEBUG not set

    let config = Config::from_env()?;

    println!("Configuration:");
    println!("  App Name: {}", config.app_name);
    println!("  API Key: {:?}", config.api_key); // None
    println!("  Port: {:?}", config.port); // Some(8080)
    println!("  Debug: {:?}", config.debug); // None
    println!("  Replicas: {:?}", config.replicas); // None

    Ok(())
}
