//! CLI command handling
//!
//! Dispatches CLI commands to the scenario runner and formats output.

use std::path::Path;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Result};
use crate::http::ReqwestTransport;
use crate::testing::{
    builtin, builtin_names, builtin_source, run_suite, ScenarioRunner, SuiteEntry, TestScenario,
};

/// Options shared by every command
pub struct GlobalOptions<'a> {
    pub config_path: Option<&'a Path>,
    pub verbose: bool,
}

/// Dispatch a CLI command
///
/// Returns `Ok(false)` when scenarios ran but at least one failed.
pub async fn dispatch(command: Commands, options: GlobalOptions<'_>) -> Result<bool> {
    let config = match options.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match command {
        Commands::Run { paths, base_url } => {
            let entries = paths
                .iter()
                .map(|path| SuiteEntry {
                    name: path.display().to_string(),
                    scenario: TestScenario::load(path),
                })
                .collect();
            run_entries(&config, entries, base_url, options.verbose).await
        }

        Commands::Builtin { only, base_url } => {
            let names = match only {
                Some(name) => {
                    // Fail before any request if the name is wrong
                    builtin_source(&name)?;
                    vec![name]
                }
                None => builtin_names().into_iter().map(String::from).collect(),
            };
            let entries = names
                .into_iter()
                .map(|name| SuiteEntry {
                    scenario: builtin(&name),
                    name,
                })
                .collect();
            run_entries(&config, entries, base_url, options.verbose).await
        }

        Commands::Show { name } => {
            print!("{}", builtin_source(&name)?);
            Ok(true)
        }

        Commands::Config => {
            match options.config_path.map(Path::to_path_buf).or_else(paths::config_path) {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found, using defaults)" };
                    println!("Config file: {}{}", path.display(), state);
                }
                None => println!("Config file: unavailable on this platform"),
            }
            println!(
                "Default base URL: {}",
                config.defaults.base_url.as_deref().unwrap_or("(none)")
            );
            println!("User-Agent: {}", config.http.user_agent);
            match config.http.timeout_secs {
                Some(secs) => println!("Request timeout: {}s", secs),
                None => println!("Request timeout: transport default"),
            }
            Ok(true)
        }
    }
}

async fn run_entries(
    config: &Config,
    entries: Vec<SuiteEntry>,
    base_url: Option<String>,
    verbose: bool,
) -> Result<bool> {
    let transport = ReqwestTransport::new(&config.http)?;
    let runner = ScenarioRunner::new(&transport)
        .base_url_override(base_url)
        .fallback_base_url(config.defaults.base_url.clone())
        .verbose(verbose);

    let report = run_suite(&runner, entries).await;
    report.print_summary();

    Ok(report.all_passed())
}
