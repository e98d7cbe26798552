//! Pre-flight requirement gate.
//!
//! Runs once over the full execution plan before any target body executes.
//! Targets are checked in plan order and requirements in declaration order,
//! so the first reported violation is the same on every run.

use crate::error::RequirementViolation;
use crate::obs;
use crate::plan::ExecutionPlan;

/// Validates the requirements of every target in an execution plan.
pub struct RequirementValidator;

impl RequirementValidator {
    /// Fail with the first requirement that does not hold against `state`.
    pub fn validate<S>(plan: &ExecutionPlan<'_, S>, state: &S) -> Result<(), RequirementViolation> {
        let mut checked = 0usize;
        for target in plan.iter() {
            for requirement in &target.requirements {
                checked += 1;
                if !requirement.is_satisfied(state) {
                    let violation = RequirementViolation {
                        target: target.name.clone(),
                        kind: requirement.kind(),
                        description: requirement.description().to_string(),
                    };
                    obs::emit_requirement_violated(&violation);
                    return Err(violation);
                }
            }
        }
        obs::emit_requirements_validated(plan.len(), checked);
        Ok(())
    }

    /// Collect every violation instead of stopping at the first.
    ///
    /// Used for diagnostics listings; the gate itself uses [`Self::validate`].
    pub fn violations<S>(plan: &ExecutionPlan<'_, S>, state: &S) -> Vec<RequirementViolation> {
        plan.iter()
            .flat_map(move |target| {
                target
                    .requirements
                    .iter()
                    .filter(move |r| !r.is_satisfied(state))
                    .map(move |r| RequirementViolation {
                        target: target.name.clone(),
                        kind: r.kind(),
                        description: r.description().to_string(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequirementKind;
    use crate::graph::{DependencyClosure, TargetGraph};
    use crate::requirement::Requirement;
    use crate::target::Target;

    #[derive(Default)]
    struct State {
        api_key: Option<String>,
        configuration: String,
    }

    fn graph() -> TargetGraph<State> {
        TargetGraph::new(vec![
            Target::new("Compile").requires(Requirement::predicate(
                "!configuration.is_empty()",
                |s: &State| !s.configuration.is_empty(),
            )),
            Target::new("Deploy")
                .depends_on("Compile")
                .requires(Requirement::field("ApiKey", |s: &State| s.api_key.as_ref())),
        ])
        .unwrap()
    }

    #[test]
    fn test_satisfied_plan_passes() {
        let g = graph();
        let plan = g.closure(&["Deploy"]).unwrap();
        let state = State {
            api_key: Some("secret".to_string()),
            configuration: "Release".to_string(),
        };
        assert!(RequirementValidator::validate(&plan, &state).is_ok());
    }

    #[test]
    fn test_missing_field_reports_target_and_field() {
        let g = graph();
        let plan = g.closure(&["Deploy"]).unwrap();
        let state = State {
            api_key: None,
            configuration: "Release".to_string(),
        };
        let err = RequirementValidator::validate(&plan, &state).unwrap_err();
        assert_eq!(err.target, "Deploy");
        assert_eq!(err.kind, RequirementKind::Field);
        let msg = err.to_string();
        assert!(msg.contains("Deploy"));
        assert!(msg.contains("ApiKey"));
        assert!(msg.contains("field"));
    }

    #[test]
    fn test_first_violation_follows_plan_order() {
        let g = graph();
        let plan = g.closure(&["Deploy"]).unwrap();
        let state = State::default();

        let first = RequirementValidator::validate(&plan, &state).unwrap_err();
        let again = RequirementValidator::validate(&plan, &state).unwrap_err();
        assert_eq!(first, again);
        assert_eq!(first.target, "Compile");
        assert_eq!(
            first.to_string(),
            "Target 'Compile' requires '!configuration.is_empty()'."
        );
    }

    #[test]
    fn test_violations_lists_all_in_order() {
        let g = graph();
        let plan = g.closure(&["Deploy"]).unwrap();
        let all = RequirementValidator::violations(&plan, &State::default());
        let targets: Vec<&str> = all.iter().map(|v| v.target.as_str()).collect();
        assert_eq!(targets, vec!["Compile", "Deploy"]);
    }

    #[test]
    fn test_unplanned_targets_are_not_checked() {
        let g = graph();
        let plan = g.closure(&["Compile"]).unwrap();
        let state = State {
            api_key: None,
            configuration: "Debug".to_string(),
        };
        assert!(RequirementValidator::validate(&plan, &state).is_ok());
    }
}
