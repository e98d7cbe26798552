//! Error taxonomy for target planning, requirement checks and build definitions.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which shape of requirement was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequirementKind {
    Predicate,
    Field,
    Property,
}

impl RequirementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementKind::Predicate => "predicate",
            RequirementKind::Field => "field",
            RequirementKind::Property => "property",
        }
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target's declared requirement did not hold against the build state.
///
/// The display string is the user-facing message reported by the pre-flight gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementViolation {
    /// Name of the target declaring the requirement.
    pub target: String,
    /// Shape of the failed requirement.
    pub kind: RequirementKind,
    /// Predicate source text, or the field/property name.
    pub description: String,
}

impl fmt::Display for RequirementViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RequirementKind::Predicate => {
                write!(f, "Target '{}' requires '{}'.", self.target, self.description)
            }
            RequirementKind::Field | RequirementKind::Property => write!(
                f,
                "Target '{}' requires that {} '{}' must be not null.",
                self.target, self.kind, self.description
            ),
        }
    }
}

impl std::error::Error for RequirementViolation {}

/// Errors produced while building the target graph or resolving a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Two targets were registered under the same name.
    #[error("duplicate target name: {name}")]
    DuplicateTarget { name: String },

    /// A requested entry target does not exist in the graph.
    #[error("target not found in graph: {name}")]
    TargetNotFound { name: String },

    /// A target depends on a name that was never registered.
    #[error("target '{target}' depends on unknown target '{dependency}'")]
    UnknownDependency { target: String, dependency: String },

    /// The dependency edges form a cycle.
    #[error("dependency cycle detected involving targets: {targets:?}")]
    DependencyCycle { targets: Vec<String> },
}

/// Errors produced while loading a build definition file.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to read build definition {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse build definition: {0}")]
    Parse(#[from] toml::de::Error),

    /// A requirement entry is not exactly one of `field`, `property` or `predicate`.
    #[error("target '{target}' declares a requirement of unsupported shape (keys: {keys:?})")]
    UnsupportedRequirementShape { target: String, keys: Vec<String> },

    #[error("invalid parameter override '{0}', expected KEY=VALUE")]
    InvalidParameter(String),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Umbrella error for a build run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Requirement(#[from] RequirementViolation),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Result type for planning operations.
pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
