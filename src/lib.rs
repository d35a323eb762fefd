//! Core library entry for the `labsync` CLI.
//!
//! `labsync` keeps the links of an EVE-NG lab in line with a declarative
//! manifest. The [`link`] module holds the reconciliation engine; it talks
//! to the lab only through the [`ports`] traits, which the [`adapters`]
//! implement against a live server, recorded cassettes, or an in-memory lab.

pub mod adapters;
pub mod apply;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod link;
pub mod logging;
pub mod ports;
pub mod store;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init(cli.global.verbose);
    commands::dispatch(&cli.global, &cli.command)
}
