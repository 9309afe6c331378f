// EnvEnum maps text onto enum variants and has nothing to do for a struct

use envira::EnvEnum;

#[derive(EnvEnum)]
struct Level;

fn main() {}
