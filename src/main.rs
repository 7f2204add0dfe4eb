//! apiflow - sequential HTTP API scenario runner
//!
//! Runs end-to-end API scenarios step by step, carrying the identifier
//! returned by a create call into the requests that follow it.

use std::path::PathBuf;

use apiflow::cli::{self, GlobalOptions};
use apiflow::commands::Commands;
use apiflow::common::logging;
use clap::Parser;

#[derive(Parser)]
#[command(name = "apiflow", about = "Sequential HTTP API scenario runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output: request details and response bodies
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose);

    let options = GlobalOptions {
        config_path: cli.config.as_deref(),
        verbose: cli.verbose,
    };

    match cli::dispatch(cli.command, options).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
