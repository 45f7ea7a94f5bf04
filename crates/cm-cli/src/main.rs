//! cqlmig - versioned schema migrations for keyspace-scoped stores

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::common::ExitCode;
use commands::{create, list, up};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result: Result<()> = match &cli.command {
        cli::Commands::Create(args) => create::execute(args, &cli.global).await,
        cli::Commands::List => list::execute(&cli.global).await,
        cli::Commands::Log => commands::log::execute(&cli.global).await,
        cli::Commands::Up => up::execute(&cli.global).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(code) => std::process::ExitCode::from(u8::try_from(code.0).unwrap_or(1)),
            None => {
                eprintln!("Error: {err:#}");
                std::process::ExitCode::FAILURE
            }
        },
    }
}

/// Log filter used when `RUST_LOG` is unset.
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(verbose)),
    )
    .format_timestamp(None)
    .init();
}
