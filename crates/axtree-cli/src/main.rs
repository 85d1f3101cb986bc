//! axtree-dump
//!
//! Rebuilds normalized accessibility trees from a recorded snapshot.
//!
//! Usage from workspace root:
//!   cargo run --bin axtree-dump -- dump --snapshot desktop.json
//!   cargo run --bin axtree-dump -- dump --snapshot desktop.json --root win-1 --event
//!   cargo run --bin axtree-dump -- dump --snapshot desktop.json --segment out.png --print

use crate::cli::{Cli, Commands};
use crate::command::handle_dump_command;
use tracing_appender::non_blocking::WorkerGuard;

mod cli;
mod command;

/// Log to stderr so stdout carries only JSON. The guard must outlive `main`'s work.
fn init_logging(verbose: bool) -> WorkerGuard {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(writer).with_target(false))
        .try_init();
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use clap::Parser;
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose);

    match cli.command {
        Commands::Dump(args) => handle_dump_command(args).await,
    }
}
