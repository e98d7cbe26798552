//! Build definition files (`stagehand.toml`).
//!
//! ```toml
//! [parameters]
//! configuration = "Debug"
//!
//! [[target]]
//! name = "Publish"
//! depends_on = ["Pack"]
//! requires = [
//!     { field = "api_key" },
//!     { property = "NUGET_SOURCE" },
//!     { predicate = "configuration", equals = "Release" },
//! ]
//! ```
//!
//! Tables other than `parameters` and `target` are left for other readers
//! of the same file (CI host declarations live under `[[host]]`).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use toml::{Table, Value};

use crate::error::DefinitionError;
use crate::graph::TargetGraph;
use crate::requirement::Requirement;
use crate::state::ParameterState;
use crate::target::Target;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDefinition {
    parameters: BTreeMap<String, Value>,
    #[serde(rename = "target")]
    targets: Vec<RawTarget>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    requires: Vec<Table>,
}

/// A loaded build: its validated target graph and initial build state.
#[derive(Debug)]
pub struct BuildDefinition {
    pub graph: TargetGraph<ParameterState>,
    pub state: ParameterState,
}

impl BuildDefinition {
    /// Read and parse a definition file, snapshotting the process environment.
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawDefinition = toml::from_str(&content)?;
        let state = ParameterState::with_process_env(raw.parameters.clone());
        Self::from_raw(raw, state)
    }

    /// Parse a definition from a string against an explicit environment.
    pub fn from_toml_str(
        content: &str,
        environment: BTreeMap<String, String>,
    ) -> Result<Self, DefinitionError> {
        let raw: RawDefinition = toml::from_str(content)?;
        let state = ParameterState::new(raw.parameters.clone(), environment);
        Self::from_raw(raw, state)
    }

    fn from_raw(raw: RawDefinition, state: ParameterState) -> Result<Self, DefinitionError> {
        let targets = raw
            .targets
            .into_iter()
            .map(build_target)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            graph: TargetGraph::new(targets)?,
            state,
        })
    }
}

fn build_target(raw: RawTarget) -> Result<Target<ParameterState>, DefinitionError> {
    let requirements = raw
        .requires
        .iter()
        .map(|table| build_requirement(&raw.name, table))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Target {
        name: raw.name,
        description: raw.description,
        depends_on: raw.depends_on,
        requirements,
    })
}

fn build_requirement(
    target: &str,
    table: &Table,
) -> Result<Requirement<ParameterState>, DefinitionError> {
    let unsupported = || DefinitionError::UnsupportedRequirementShape {
        target: target.to_string(),
        keys: table.keys().cloned().collect(),
    };

    let name = |key: &str| table.get(key).and_then(Value::as_str).map(str::to_string);

    let mut keys: Vec<&str> = table.keys().map(String::as_str).collect();
    keys.sort_unstable();

    match keys.as_slice() {
        ["field"] => {
            let field = name("field").ok_or_else(unsupported)?;
            let lookup = field.clone();
            Ok(Requirement::field(field, move |s: &ParameterState| {
                s.field(&lookup)
            }))
        }
        ["property"] => {
            let property = name("property").ok_or_else(unsupported)?;
            let lookup = property.clone();
            Ok(Requirement::property(property, move |s: &ParameterState| {
                s.property(&lookup).map(str::to_string)
            }))
        }
        ["predicate"] => {
            let parameter = name("predicate").ok_or_else(unsupported)?;
            let lookup = parameter.clone();
            Ok(Requirement::predicate(parameter, move |s: &ParameterState| {
                s.field(&lookup).and_then(Value::as_bool) == Some(true)
            }))
        }
        ["equals", "predicate"] => {
            let parameter = name("predicate").ok_or_else(unsupported)?;
            let expected = table.get("equals").cloned().ok_or_else(unsupported)?;
            let source = format!("{parameter} == {expected}");
            Ok(Requirement::predicate(source, move |s: &ParameterState| {
                s.field(&parameter) == Some(&expected)
            }))
        }
        _ => Err(unsupported()),
    }
}
