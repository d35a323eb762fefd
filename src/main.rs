//! Binary entrypoint for the `labsync` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match labsync::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
