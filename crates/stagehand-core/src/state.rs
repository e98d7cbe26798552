//! Build state resolved by requirement accessors.

use std::collections::BTreeMap;

use toml::Value;

use crate::error::DefinitionError;

/// Build state for definition-file builds.
///
/// *Fields* are the declared build parameters, optionally overridden on the
/// command line. *Properties* are computed from an environment snapshot taken
/// when the state is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterState {
    fields: BTreeMap<String, Value>,
    environment: BTreeMap<String, String>,
}

impl ParameterState {
    pub fn new(fields: BTreeMap<String, Value>, environment: BTreeMap<String, String>) -> Self {
        Self {
            fields,
            environment,
        }
    }

    /// Snapshot the process environment alongside the given fields.
    pub fn with_process_env(fields: BTreeMap<String, Value>) -> Self {
        Self::new(fields, std::env::vars().collect())
    }

    /// A declared parameter, if set.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// A computed property, if the environment provides it.
    ///
    /// Empty values count as absent.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.environment
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Apply a `KEY=VALUE` override. Booleans, integers and finite floats are
    /// recognised, everything else is stored as a string.
    pub fn apply_override(&mut self, raw: &str) -> Result<(), DefinitionError> {
        let (key, value) = raw
            .split_once('=')
            .filter(|(k, _)| !k.trim().is_empty())
            .ok_or_else(|| DefinitionError::InvalidParameter(raw.to_string()))?;
        self.set_field(key.trim(), parse_scalar(value.trim()));
        Ok(())
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

fn parse_scalar(raw: &str) -> Value {
    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => {
            if let Ok(integer) = raw.parse::<i64>() {
                return Value::Integer(integer);
            }
            match raw.parse::<f64>() {
                Ok(float) if float.is_finite() => Value::Float(float),
                _ => Value::String(raw.to_string()),
            }
        }
    }
}
