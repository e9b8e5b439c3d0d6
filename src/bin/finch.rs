//! finch CLI binary entry point.

use std::process::ExitCode;

fn main() -> ExitCode {
    finch::cli::run()
}
