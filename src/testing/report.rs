//! Suite execution and summary

use colored::Colorize;

use crate::common::Result;

use super::config::TestScenario;
use super::runner::{ScenarioRunner, TestResult};

/// A scenario to run, or the reason it could not be loaded
pub struct SuiteEntry {
    pub name: String,
    pub scenario: Result<TestScenario>,
}

/// Outcome of a suite run
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Print a one-line-per-scenario summary
    pub fn print_summary(&self) {
        println!("\n{}", "Summary:".cyan().bold());
        for result in &self.results {
            if result.passed {
                println!(
                    "  {} {} ({}/{} steps)",
                    "✓".green(),
                    result.name,
                    result.steps_run,
                    result.steps_total
                );
            } else {
                println!(
                    "  {} {} ({}/{} steps)",
                    "✗".red(),
                    result.name,
                    result.steps_run,
                    result.steps_total
                );
                if let Some(error) = &result.error {
                    println!("      {}", error.dimmed());
                }
            }
        }

        let line = format!("{} passed, {} failed", self.passed(), self.failed());
        if self.all_passed() {
            println!("\n{}\n", line.green().bold());
        } else {
            println!("\n{}\n", line.red().bold());
        }
    }
}

/// Run independent scenarios one after another
///
/// Each scenario gets a fresh context. A scenario that fails to load or
/// fails a step does not stop the ones after it.
pub async fn run_suite(runner: &ScenarioRunner<'_>, entries: Vec<SuiteEntry>) -> SuiteReport {
    let mut report = SuiteReport::default();

    for entry in entries {
        let result = match entry.scenario {
            Ok(scenario) => runner.run(&scenario).await,
            Err(e) => {
                println!("\n{} {}: {}", "✗".red(), entry.name, e.to_string().red());
                tracing::warn!(scenario = %entry.name, error = %e, "scenario could not be loaded");
                TestResult::load_failure(&entry.name, &e)
            }
        };
        report.results.push(result);
    }

    tracing::info!(
        passed = report.passed(),
        failed = report.failed(),
        "suite finished"
    );

    report
}
