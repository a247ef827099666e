// src/bin/cli.rs
use std::process::ExitCode;

use aup_kml::cli;

fn main() -> ExitCode {
    cli::run()
}
