//! Response assertions

use serde_json::Value;

use crate::common::{Error, Result};
use crate::http::HttpResponse;

use super::config::BodyAssertion;
use super::template::lookup;

/// Longest body excerpt included in a failure message
const EXCERPT_LEN: usize = 200;

/// Check the response status against the expected code
pub fn check_status(response: &HttpResponse, expected: u16) -> Result<()> {
    if response.status != expected {
        return Err(Error::TestAssertion(format!(
            "Expected status {}, got {}. Body: {}",
            expected,
            response.status,
            excerpt(&response.body)
        )));
    }
    Ok(())
}

/// Check every body assertion against the JSON response body
pub fn check_body(response: &HttpResponse, asserts: &[BodyAssertion]) -> Result<()> {
    if asserts.is_empty() {
        return Ok(());
    }

    let body = response.json().ok_or_else(|| {
        Error::TestAssertion(format!(
            "Response body is not JSON: {}",
            excerpt(&response.body)
        ))
    })?;

    for assertion in asserts {
        let actual = lookup(&body, &assertion.path);

        if let Some(should_exist) = assertion.exists {
            if should_exist != actual.is_some() {
                return Err(Error::TestAssertion(format!(
                    "Field '{}': expected exists={}, got exists={}",
                    assertion.path,
                    should_exist,
                    actual.is_some()
                )));
            }
        }

        if let Some(expected) = &assertion.equals {
            match actual {
                Some(value) if json_eq(value, expected) => {}
                Some(value) => {
                    return Err(Error::TestAssertion(format!(
                        "Field '{}': expected {}, got {}",
                        assertion.path, expected, value
                    )));
                }
                None => {
                    return Err(Error::TestAssertion(format!(
                        "Field '{}' not found; expected {}",
                        assertion.path, expected
                    )));
                }
            }
        }

        if let Some(expected_substr) = &assertion.contains {
            let text = actual.map(string_form).ok_or_else(|| {
                Error::TestAssertion(format!(
                    "Field '{}' not found; expected it to contain '{}'",
                    assertion.path, expected_substr
                ))
            })?;
            if !text.contains(expected_substr.as_str()) {
                return Err(Error::TestAssertion(format!(
                    "Field '{}': expected value containing '{}', got '{}'",
                    assertion.path, expected_substr, text
                )));
            }
        }
    }

    Ok(())
}

/// JSON equality where numbers compare by value (2019 == 2019.0)
fn json_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).map(|w| json_eq(v, w)).unwrap_or(false))
        }
        _ => actual == expected,
    }
}

fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= EXCERPT_LEN {
        return body.to_string();
    }
    let cut: String = body.chars().take(EXCERPT_LEN).collect();
    format!("{}...", cut)
}
