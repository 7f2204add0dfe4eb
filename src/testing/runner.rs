//! Test runner implementation
//!
//! Executes scenario steps strictly in order. Each request is awaited
//! before the next step is rendered, and the first failing step halts the
//! scenario.

use colored::Colorize;

use crate::common::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, Transport};

use super::assertions::{check_body, check_status};
use super::config::{BodyAssertion, TestScenario, TestStep};
use super::context::{Identifier, SharedContext};
use super::template::{lookup, render_str, render_url, render_value, resolve_url};

/// Result of a test run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub error: Option<String>,
    /// Identifier captured during the run, if any
    pub identifier: Option<Identifier>,
}

impl TestResult {
    /// A scenario that could not be loaded at all
    pub fn load_failure(name: &str, error: &Error) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            steps_run: 0,
            steps_total: 0,
            error: Some(error.to_string()),
            identifier: None,
        }
    }
}

/// Runs scenarios over a [`Transport`]
pub struct ScenarioRunner<'a> {
    transport: &'a dyn Transport,
    base_url_override: Option<String>,
    fallback_base_url: Option<String>,
    verbose: bool,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self {
            transport,
            base_url_override: None,
            fallback_base_url: None,
            verbose: false,
        }
    }

    /// Base URL that wins over the scenario's own `base_url`
    pub fn base_url_override(mut self, base_url: Option<String>) -> Self {
        self.base_url_override = base_url;
        self
    }

    /// Base URL used when the scenario has none
    pub fn fallback_base_url(mut self, base_url: Option<String>) -> Self {
        self.fallback_base_url = base_url;
        self
    }

    /// Print response bodies to stdout as well as logging them
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn base_url_for<'s>(&'s self, scenario: &'s TestScenario) -> Option<&'s str> {
        self.base_url_override
            .as_deref()
            .or(scenario.base_url.as_deref())
            .or(self.fallback_base_url.as_deref())
    }

    /// Run every step of a scenario in order
    ///
    /// Step failures are reported in the returned result rather than as an
    /// error, so a suite can continue with the next scenario.
    pub async fn run(&self, scenario: &TestScenario) -> TestResult {
        let steps_total = scenario.steps.len();
        let base_url = self.base_url_for(scenario);

        println!(
            "\n{} {}",
            "Running Test:".blue().bold(),
            scenario.name.white().bold()
        );
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }
        if self.verbose {
            if let Some(base) = base_url {
                println!("  Base URL: {}", base.dimmed());
            }
        }

        tracing::info!(scenario = %scenario.name, steps = steps_total, "scenario started");

        let mut context = SharedContext::new();

        println!("\n{}", "Steps:".cyan());

        for (i, step) in scenario.steps.iter().enumerate() {
            let step_num = i + 1;

            match self.execute_step(step, step_num, base_url, &mut context).await {
                Ok(response) => {
                    println!(
                        "  {} Step {}: {} ({})",
                        "✓".green(),
                        step_num,
                        step.label().dimmed(),
                        response.status
                    );
                    if step.capture.is_some() {
                        if let Some(id) = context.identifier() {
                            println!("      captured id = {}", id.to_string().yellow());
                        }
                    }
                }
                Err(e) => {
                    println!("  {} Step {}: {}", "✗".red(), step_num, step.label());
                    println!("      {}", e.to_string().red());
                    let kind = if e.is_assertion() { "assertion" } else { "error" };
                    tracing::warn!(
                        scenario = %scenario.name,
                        step = step_num,
                        kind,
                        error = %e,
                        "step failed"
                    );

                    return TestResult {
                        name: scenario.name.clone(),
                        passed: false,
                        steps_run: step_num,
                        steps_total,
                        error: Some(format!("Step {} ({}): {}", step_num, step.label(), e)),
                        identifier: context.identifier().cloned(),
                    };
                }
            }
        }

        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Test Passed".green().bold()
        );

        TestResult {
            name: scenario.name.clone(),
            passed: true,
            steps_run: steps_total,
            steps_total,
            error: None,
            identifier: context.identifier().cloned(),
        }
    }

    /// Run one step and, if it declares `capture`, store the identifier
    async fn execute_step(
        &self,
        step: &TestStep,
        step_num: usize,
        base_url: Option<&str>,
        context: &mut SharedContext,
    ) -> Result<HttpResponse> {
        let response = self.run_step(step, step_num, base_url, context).await?;
        if let Some(field) = &step.capture {
            capture_identifier(&response, field, context)?;
        }
        Ok(response)
    }

    /// Send the request for `step` and check its expectations
    ///
    /// The identifier is substituted into the URL (as an escaped path
    /// segment), headers, body and expected values. Rendering happens before
    /// anything is sent, so a step that needs an unset identifier fails
    /// without a request.
    pub async fn run_step(
        &self,
        step: &TestStep,
        step_num: usize,
        base_url: Option<&str>,
        context: &SharedContext,
    ) -> Result<HttpResponse> {
        let url = resolve_url(base_url, &render_url(&step.url, context, step_num)?)?;

        let mut headers = Vec::with_capacity(step.headers.len() + 1);
        for (name, value) in &step.headers {
            headers.push((name.clone(), render_str(value, context, step_num)?));
        }

        let body = match &step.body {
            Some(value) => Some(serde_json::to_string(&render_value(value, context, step_num)?)?),
            None => None,
        };
        if body.is_some()
            && !headers
                .iter()
                .any(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let asserts = step
            .expect
            .body
            .iter()
            .map(|a| render_assertion(a, context, step_num))
            .collect::<Result<Vec<_>>>()?;

        let request = HttpRequest {
            method: step.method,
            url,
            headers,
            body,
        };
        let method = request.method;
        let url = request.url.clone();

        tracing::debug!(step = step_num, %method, %url, body = ?request.body, "request");

        let response = self.transport.send(request).await?;

        tracing::info!(
            step = step_num,
            %method,
            %url,
            status = response.status,
            body = %response.body,
            "response"
        );
        if self.verbose {
            println!("      {} {} -> {}", method, url, response.status);
            println!("      {}", response.body.dimmed());
        }

        check_status(&response, step.expect.status)?;
        check_body(&response, &asserts)?;

        Ok(response)
    }
}

/// Extract the identifier at `field` from the response and store it
pub fn capture_identifier(
    response: &HttpResponse,
    field: &str,
    context: &mut SharedContext,
) -> Result<Identifier> {
    let body = response
        .json()
        .ok_or_else(|| Error::capture_failed(field, "response body is not JSON"))?;
    let value =
        lookup(&body, field).ok_or_else(|| Error::capture_failed(field, "field not present"))?;
    let identifier =
        Identifier::from_value(value).map_err(|reason| Error::capture_failed(field, reason))?;

    context.set(identifier.clone())?;
    tracing::info!(field, id = %identifier, "captured identifier");

    Ok(identifier)
}

fn render_assertion(
    assertion: &BodyAssertion,
    context: &SharedContext,
    step_num: usize,
) -> Result<BodyAssertion> {
    Ok(BodyAssertion {
        path: assertion.path.clone(),
        equals: assertion
            .equals
            .as_ref()
            .map(|v| render_value(v, context, step_num))
            .transpose()?,
        contains: assertion
            .contains
            .as_deref()
            .map(|s| render_str(s, context, step_num))
            .transpose()?,
        exists: assertion.exists,
    })
}
