use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{check_config::CheckConfigArg, discover::DiscoverArg};

mod check_config;
mod discover;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug-level events (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Discover failure precursor sequences and warning signs in historical records
    Discover(#[clap(flatten)] DiscoverArg),
    /// Validate configuration files and print the resolved state layout
    CheckConfig(#[clap(flatten)] CheckConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Discover(arg) => discover::run(&arg)?,
        Mode::CheckConfig(arg) => check_config::run(&arg)?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
