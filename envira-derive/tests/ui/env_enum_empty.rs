// An enum without variants can never be constructed from a value

use envira::EnvEnum;

#[derive(EnvEnum)]
enum Level {}

fn main() {}
