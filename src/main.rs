//! ck-harvest CLI entry point

use ck_harvest::{cli, error};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = cli::run(cli) {
        eprintln!("{} {:#}", console::style("error:").red().bold(), e);
        std::process::exit(error::exit_code_for(&e));
    }
}
