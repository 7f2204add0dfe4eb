//! Scenarios compiled into the binary

use crate::common::{Error, Result};

use super::config::TestScenario;

/// Built-in scenarios as (name, YAML source)
const BUILTINS: &[(&str, &str)] = &[
    ("crud", include_str!("../../scenarios/objects_crud.yaml")),
    ("collection", include_str!("../../scenarios/collection.yaml")),
];

/// Names of all built-in scenarios, in suite order
pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.iter().map(|(name, _)| *name).collect()
}

/// YAML source of a built-in scenario
pub fn builtin_source(name: &str) -> Result<&'static str> {
    BUILTINS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, src)| *src)
        .ok_or_else(|| Error::UnknownBuiltin {
            name: name.to_string(),
            available: builtin_names().join(", "),
        })
}

/// Parse a built-in scenario
pub fn builtin(name: &str) -> Result<TestScenario> {
    TestScenario::from_yaml(builtin_source(name)?, &format!("builtin:{}", name))
}
