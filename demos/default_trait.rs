//! Example demonstrating #[envira(default)] using Default trait

use envira::EnvConfig;

#[derive(Debug, EnvConfig)]
struct Config {
    // Uses Default::default() if not set
    #[envira(default)]
    pub host: String, // "" (empty string)

    #[envira(default)]
    pub port: u16, // 0

    #[envira(default)]
    pub allowed_origins: Vec<String>, // []

    // Explicit default values for comparison
    #[envira(default = "localhost".to_string())]
    pub server: String,

    #[envira(default = 8080)]
    pub api_port: u16,

    #[envira(default = true)]
    pub verbose: bool,
}

fn main() -> anyhow::Result<()> {
    // Don't set any environment variables
    std::env::remove_var("HOST");
    std::env::remove_var("PORT");
    std::env::remove_var("ALLOWED_ORIGINS");
    std::env::remove_var("SERVER");
    std::env::remove_var("API_PORT");
    std::env::remove_var("VERBOSE");

    let config = Config::from_env()?;

    println!("Configuration with defaults:");
    println!("  Host (Default trait): '{}'", config.host); // ""
    println!("  Port (Default trait): {}", config.port); // 0
    println!("  Allowed origins (Default trait): {:?}", config.allowed_origins); // []
    println!("  Server (explicit): '{}'", config.server); // "localhost"
    println!("  API Port (explicit): {}", config.api_port); // 8080
    println!("  Verbose (explicit): {}", config.verbose); // true

    Ok(())
}
