//! Scenario runner
//!
//! Loads HTTP test scenarios from YAML, executes their steps in order
//! against a [`Transport`](crate::http::Transport), carries the captured
//! identifier between steps and asserts on each response.

mod assertions;
mod builtin;
mod config;
mod context;
mod report;
mod runner;
mod template;

pub use builtin::{builtin, builtin_names, builtin_source};
pub use config::*;
pub use context::{Identifier, SharedContext};
pub use report::{run_suite, SuiteEntry, SuiteReport};
pub use runner::{capture_identifier, ScenarioRunner, TestResult};
pub use template::ID_PLACEHOLDER;
