//! Stagehand Core Library
//!
//! Target model, dependency-closure planning and the pre-flight requirement
//! gate that runs over a resolved execution plan before any target body
//! executes.

pub mod definition;
pub mod error;
pub mod graph;
pub mod obs;
pub mod plan;
pub mod requirement;
pub mod state;
pub mod target;
pub mod telemetry;
pub mod validate;

pub use definition::BuildDefinition;
pub use error::{
    BuildError, DefinitionError, PlanError, PlanResult, RequirementKind, RequirementViolation,
    Result,
};
pub use graph::{DependencyClosure, TargetGraph};
pub use plan::ExecutionPlan;
pub use requirement::{Requirement, StateCheck};
pub use state::ParameterState;
pub use target::Target;
pub use telemetry::init_tracing;
pub use validate::RequirementValidator;
