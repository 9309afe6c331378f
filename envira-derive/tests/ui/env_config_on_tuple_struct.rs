// Fields are looked up by name, so a tuple struct is rejected

use envira::EnvConfig;

#[derive(EnvConfig)]
struct Config(String);

fn main() {}
