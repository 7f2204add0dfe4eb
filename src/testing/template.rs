//! Identifier substitution and JSON path lookup

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::common::{Error, Result};

use super::context::SharedContext;

/// Placeholder replaced by the captured identifier
pub const ID_PLACEHOLDER: &str = "{id}";

/// Everything except RFC 3986 unreserved characters is escaped in a segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Substitute the identifier into a string
///
/// Fails with `IdentifierUnset` if the text references the identifier and
/// none has been captured.
pub fn render_str(text: &str, context: &SharedContext, step: usize) -> Result<String> {
    if !text.contains(ID_PLACEHOLDER) {
        return Ok(text.to_string());
    }
    let id = context.require(step)?;
    Ok(text.replace(ID_PLACEHOLDER, &id.to_string()))
}

/// Substitute the identifier into a URL template as one path segment
///
/// The identifier is percent-encoded so `/`, `?` or `#` inside it cannot
/// change which resource is addressed. Dot segments are rejected because
/// URL parsers collapse them even when escaped.
pub fn render_url(template: &str, context: &SharedContext, step: usize) -> Result<String> {
    if !template.contains(ID_PLACEHOLDER) {
        return Ok(template.to_string());
    }
    let id = context.require(step)?.to_string();
    if id == "." || id == ".." {
        return Err(Error::InvalidUrl {
            url: template.to_string(),
            reason: format!("identifier '{}' is a dot segment", id),
        });
    }
    let segment = utf8_percent_encode(&id, PATH_SEGMENT).to_string();
    Ok(template.replace(ID_PLACEHOLDER, &segment))
}

/// Substitute the identifier into every string of a JSON value
///
/// A string that is exactly `{id}` becomes the identifier's own JSON value,
/// so numeric identifiers stay numbers.
pub fn render_value(value: &Value, context: &SharedContext, step: usize) -> Result<Value> {
    match value {
        Value::String(s) if s == ID_PLACEHOLDER => Ok(context.require(step)?.to_value()),
        Value::String(s) => Ok(Value::String(render_str(s, context, step)?)),
        Value::Array(items) => items
            .iter()
            .map(|v| render_value(v, context, step))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), render_value(v, context, step)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

/// Join a step URL onto the base URL
///
/// Absolute URLs are returned unchanged.
pub fn resolve_url(base: Option<&str>, url: &str) -> Result<String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(url.to_string());
    }
    let base = base.ok_or_else(|| Error::InvalidUrl {
        url: url.to_string(),
        reason: "relative URL but no base URL is configured".to_string(),
    })?;
    let base = base.trim_end_matches('/');
    if url.is_empty() {
        return Ok(base.to_string());
    }
    if url.starts_with('/') {
        Ok(format!("{}{}", base, url))
    } else {
        Ok(format!("{}/{}", base, url))
    }
}

/// Look up a dotted path in a JSON value
///
/// Object keys may contain spaces (`data.CPU model`); numeric segments
/// index arrays. An empty path or `$` selects the root.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() || path == "$" {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
