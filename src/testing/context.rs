//! Per-scenario shared state
//!
//! A scenario run owns exactly one [`SharedContext`]. It starts empty, is
//! written once by the capturing step and only read afterwards.

use std::fmt;

use serde_json::{Number, Value};

use crate::common::{Error, Result};

/// Identifier captured from a response
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    Text(String),
    Number(Number),
}

impl Identifier {
    /// Convert a JSON value into an identifier
    ///
    /// Only non-empty strings and numbers qualify.
    pub fn from_value(value: &Value) -> std::result::Result<Self, &'static str> {
        match value {
            Value::String(s) if s.trim().is_empty() => Err("value is an empty string"),
            Value::String(s) => Ok(Identifier::Text(s.clone())),
            Value::Number(n) => Ok(Identifier::Number(n.clone())),
            Value::Null => Err("value is null"),
            _ => Err("value is neither a string nor a number"),
        }
    }

    /// JSON form, keeping numbers numeric
    pub fn to_value(&self) -> Value {
        match self {
            Identifier::Text(s) => Value::String(s.clone()),
            Identifier::Number(n) => Value::Number(n.clone()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Text(s) => f.write_str(s),
            Identifier::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Identifier slot carried from step to step
#[derive(Debug, Default)]
pub struct SharedContext {
    identifier: Option<Identifier>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured identifier, if any
    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    /// The captured identifier, or an `IdentifierUnset` error for `step`
    pub fn require(&self, step: usize) -> Result<&Identifier> {
        self.identifier
            .as_ref()
            .ok_or(Error::IdentifierUnset { step })
    }

    /// Store the identifier; the slot can be written only once
    pub fn set(&mut self, identifier: Identifier) -> Result<()> {
        if let Some(existing) = &self.identifier {
            return Err(Error::IdentifierAlreadySet {
                existing: existing.to_string(),
            });
        }
        self.identifier = Some(identifier);
        Ok(())
    }
}
