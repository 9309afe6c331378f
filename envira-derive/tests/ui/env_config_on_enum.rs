// EnvConfig reads named fields, so an enum is rejected

use envira::EnvConfig;

#[derive(EnvConfig)]
enum Config { Local, Remote }

fn main() {}
