mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use docwatch_config::Config;
use exn::ResultExt;
use std::process::ExitCode;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    // Has to be asked before any other thread exists.
    let offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
        tracing::warn!("Could not determine the local time zone; using UTC");
        UtcOffset::UTC
    });
    match execute(cli, offset) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

const CRATES: [&str; 8] = [
    "docwatch",
    "docwatch_config",
    "docwatch_document",
    "docwatch_library",
    "docwatch_memory",
    "docwatch_report",
    "docwatch_repository",
    "docwatch_storage",
];

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<_> = CRATES.iter().map(|krate| format!("{krate}={level}")).collect();
        EnvFilter::new(format!("warn,{}", directives.join(",")))
    });
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(verbose > 1).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn execute(cli: Cli, offset: UtcOffset) -> Result<()> {
    if let Command::Identify { filenames } = &cli.command {
        commands::identify_all(filenames);
        return Ok(());
    }
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if cli.dry_run {
        tracing::info!("Dry run: nothing will be remembered or sent");
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .or_raise(|| ErrorKind::Runtime)?;
    runtime.block_on(async {
        match cli.command {
            Command::Run => commands::run_once(&config, cli.dry_run).await,
            Command::Watch => commands::watch(&config, cli.dry_run, offset).await,
            Command::Clear => commands::clear(&config, cli.dry_run).await,
            Command::Identify { .. } => Ok(()),
        }
    })
}
