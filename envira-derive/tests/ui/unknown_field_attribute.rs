// Misspelled or unsupported options are reported at the option itself

use envira::EnvConfig;

#[derive(EnvConfig)]
struct Config {
    #[envira(from_file)]
    pub secret: String,
}

fn main() {}
