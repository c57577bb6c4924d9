// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, run the command.
// - Every error ends in a single red line and exit code 1.

use clap::Parser;
use openverse_cli::{cli::Cli, ui};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// `quiet` silences logging, `verbose` enables debug output, otherwise
/// `RUST_LOG` decides with `warn` as the fallback.
fn init_tracing(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.quiet, cli.global.verbose);

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_unexpected() => {
            tracing::error!(error = %e, "unexpected failure");
            ui::failure(&format!("Unexpected error: {}", e));
            ExitCode::FAILURE
        }
        Err(e) => {
            ui::failure(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
