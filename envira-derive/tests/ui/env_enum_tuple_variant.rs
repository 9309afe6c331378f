// Variants are selected by their textual value and cannot carry data

use envira::EnvEnum;

#[derive(EnvEnum)]
enum Level {
    Debug,
    Custom(String),
}

fn main() {}
