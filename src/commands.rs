//! CLI command definitions
//!
//! Defines the clap commands for the apiflow CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run YAML scenario files as one suite
    Run {
        /// Paths to scenario files, run in the order given
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Base URL for relative step URLs (overrides the scenario's base_url)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Run the built-in scenarios
    Builtin {
        /// Run only this built-in scenario (crud, collection)
        #[arg(long)]
        only: Option<String>,

        /// Base URL for relative step URLs (overrides the scenario's base_url)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Print the YAML source of a built-in scenario
    Show {
        /// Built-in scenario name
        name: String,
    },

    /// Show configuration path and effective settings
    Config,
}
