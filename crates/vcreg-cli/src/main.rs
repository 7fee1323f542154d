//! vcreg - run the variance-covariance regularizer on a synthetic batch.
//!
//! Parses flags into a regularizer configuration, synthesizes a random
//! `(batch, C, H, W)` batch, computes the loss and prints it to stdout.
//! Logs go to stderr; set `RUST_LOG` to change their verbosity.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vcreg_cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing subscriber with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("vcreg=info".parse()?))
        .init();

    let cli = Cli::parse();

    info!("vcreg starting...");
    let loss = cli.run()?;
    println!("{loss}");

    Ok(())
}
