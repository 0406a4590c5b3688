use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use serfs_cli::{execute, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = cli
        .build_overlay()
        .and_then(|overlay| execute(&overlay, &cli.command, &mut std::io::stdout().lock()));

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
