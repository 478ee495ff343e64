//! Entry point for the `codexd` binary.

use std::fmt::Display;
use std::io::{self, Write};
use std::process::ExitCode;

use codex_config::{Config, ConfigError};
use codexd::ServerError;
use tracing::error;

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(loaded) => loaded,
        Err(ConfigError::Arguments { source }) => source.exit(),
    };

    match codexd::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        // No subscriber is installed to carry this one.
        Err(failure @ ServerError::Telemetry(_)) => report(&failure),
        Err(failure) => {
            error!(
                target: concat!(env!("CARGO_PKG_NAME"), "::lifecycle"),
                error = %failure,
                "server stopped"
            );
            ExitCode::FAILURE
        }
    }
}

fn report(failure: &impl Display) -> ExitCode {
    writeln!(io::stderr().lock(), "codexd: {failure}").ok();
    ExitCode::FAILURE
}
