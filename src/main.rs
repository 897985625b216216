//! rawsniff binary.
//!
//! Parses arguments, installs the shutdown handler, runs the capture loop
//! and maps the outcome to an exit code.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rawsniff::{Cli, ConsoleReporter, PacketCounts, RawSocketCapture, ShutdownFlag, Sniffer};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries the packet log
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(counts) => {
            tracing::info!("Captured {} packets", counts.total());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<PacketCounts> {
    let config = cli.into_config()?;

    let capture = RawSocketCapture::open(&config)?;
    let shutdown = ShutdownFlag::install()?;

    let mut sniffer = Sniffer::new(capture, ConsoleReporter::new(), &config);
    let counts = sniffer.run(&shutdown)?;
    Ok(counts)
}
