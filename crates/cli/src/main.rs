//! s3kit - command-line client for S3 and S3-compatible storage

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use s3kit_cli::commands::{self, Cli};

/// Log filter: `RUST_LOG` wins, then `--debug`, then warnings only
fn log_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            "s3kit=debug,s3kit_cli=debug,s3kit_client=debug,s3kit_core=debug"
        } else {
            "warn"
        })
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(cli.debug))
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
