// A flattened struct is loaded field by field and has no single value to default

use envira::EnvConfig;

#[derive(EnvConfig)]
struct BaseConfig {
    pub host: String,
}

#[derive(EnvConfig)]
struct Config {
    #[envira(flatten, default)] pub base: BaseConfig,
}

fn main() {}
