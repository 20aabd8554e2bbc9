//! Retain CLI - run a retained-code pass over a program graph.

use clap::Parser;
use retain::cli::{run, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level comes from `RETAIN_LOG`, e.g. `RETAIN_LOG=retain=debug`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("RETAIN_LOG").unwrap_or_else(|_| EnvFilter::new("retain=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
