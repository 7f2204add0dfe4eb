//! apiflow - sequential HTTP API scenario runner
//!
//! This library provides the scenario model, the HTTP transport and the
//! runner used by the `apiflow` binary.

pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{ScenarioRunner, SharedContext, TestScenario};
