//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML test scenarios.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::http::Method;

use super::template::ID_PLACEHOLDER;

/// A complete test scenario loaded from a YAML file
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestScenario {
    /// Name of the test scenario
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// Base URL that relative step URLs are joined onto
    pub base_url: Option<String>,
    /// The sequence of test steps to execute
    pub steps: Vec<TestStep>,
}

/// A single HTTP call in the execution flow
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestStep {
    /// Human-readable step name, shown in output
    pub name: Option<String>,
    /// HTTP method
    pub method: Method,
    /// Absolute URL or path relative to the base URL; may contain `{id}`
    pub url: String,
    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// JSON request body; string values may contain `{id}`
    pub body: Option<Value>,
    /// Expected outcome
    #[serde(default)]
    pub expect: Expectation,
    /// Response field holding the identifier to capture (e.g. "id")
    pub capture: Option<String>,
}

impl TestStep {
    /// Label used in progress output
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} {}", self.method, self.url),
        }
    }

    /// Whether any request part or expected value uses `{id}`
    pub fn references_identifier(&self) -> bool {
        self.url.contains(ID_PLACEHOLDER)
            || self.headers.values().any(|v| v.contains(ID_PLACEHOLDER))
            || self.body.as_ref().is_some_and(value_references_identifier)
            || self.expect.body.iter().any(|a| {
                a.equals.as_ref().is_some_and(value_references_identifier)
                    || a.contains.as_ref().is_some_and(|c| c.contains(ID_PLACEHOLDER))
            })
    }
}

fn value_references_identifier(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains(ID_PLACEHOLDER),
        Value::Array(items) => items.iter().any(value_references_identifier),
        Value::Object(map) => map.values().any(value_references_identifier),
        _ => false,
    }
}

/// Expectations for a response
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// Expected status code (default: 200)
    #[serde(default = "default_status")]
    pub status: u16,
    /// Assertions on fields of the JSON response body
    #[serde(default)]
    pub body: Vec<BodyAssertion>,
}

impl Default for Expectation {
    fn default() -> Self {
        Self {
            status: default_status(),
            body: Vec::new(),
        }
    }
}

fn default_status() -> u16 {
    200
}

/// Assertion on one field of the response body
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BodyAssertion {
    /// Dotted path into the body (e.g. "name", "data.price", "items.0.id")
    pub path: String,
    /// Expected value (exact JSON match; numbers compare numerically)
    pub equals: Option<Value>,
    /// Expected substring of the field's string form
    pub contains: Option<String>,
    /// Whether the field must be present (true) or absent (false)
    pub exists: Option<bool>,
}

impl TestScenario {
    /// Parse a scenario from YAML text
    ///
    /// `origin` names the source in error messages.
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self> {
        let scenario: TestScenario =
            serde_yaml::from_str(content).map_err(|e| Error::ScenarioParse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        scenario.validate().map_err(|message| Error::ScenarioParse {
            path: origin.to_string(),
            message,
        })?;
        Ok(scenario)
    }

    /// Load and parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Structural checks that do not need the network
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("scenario name is empty".to_string());
        }
        if self.steps.is_empty() {
            return Err("scenario has no steps".to_string());
        }

        let mut capture_step = None;
        for (i, step) in self.steps.iter().enumerate() {
            if step.url.trim().is_empty() {
                return Err(format!("step {} has an empty url", i + 1));
            }
            // A step renders before its own capture runs
            if capture_step.is_none() && step.references_identifier() {
                return Err(format!(
                    "step {} references {} before any step captures an identifier",
                    i + 1,
                    ID_PLACEHOLDER
                ));
            }
            if let Some(field) = &step.capture {
                if field.trim().is_empty() {
                    return Err(format!("step {} has an empty capture field", i + 1));
                }
                // The context holds a single write-once identifier
                if let Some(first) = capture_step {
                    return Err(format!(
                        "steps {} and {} both capture an identifier; only one capture is allowed",
                        first,
                        i + 1
                    ));
                }
                capture_step = Some(i + 1);
            }
            for assertion in &step.expect.body {
                if assertion.equals.is_none()
                    && assertion.contains.is_none()
                    && assertion.exists.is_none()
                {
                    return Err(format!(
                        "step {}: assertion on '{}' has no equals/contains/exists check",
                        i + 1,
                        assertion.path
                    ));
                }
            }
        }
        Ok(())
    }
}
