//! tinyenv CLI binary

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tinyenv_lib::cli::{Cli, clap_exit, commands};
use tinyenv_lib::core::format_error_with_suggestion;

/// Environment variable holding the log filter, e.g. `TINYENV_LOG=debug`
const LOG_ENV: &str = "TINYENV_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return clap_exit(&err),
    };

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                return clap_exit(clap_err);
            }
            eprintln!("{}", format_error_with_suggestion(&err));
            ExitCode::FAILURE
        }
    }
}
