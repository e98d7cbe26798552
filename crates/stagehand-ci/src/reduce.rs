//! Reduction of the full target graph to the subset a CI host runs.

use std::collections::HashSet;

use stagehand_core::{DependencyClosure, ExecutionPlan, PlanResult};
use tracing::warn;

/// Computes the ordered, duplicate-free targets relevant to one CI host.
pub struct PlanReducer;

impl PlanReducer {
    /// Union the dependency closures of `relevant` (in declaration order),
    /// keep the first occurrence of every target, then drop any target named
    /// in `irrelevant`.
    pub fn reduce<'g, S, P>(
        planner: &'g P,
        relevant: &[String],
        irrelevant: &[String],
    ) -> PlanResult<ExecutionPlan<'g, S>>
    where
        P: DependencyClosure<S> + ?Sized,
    {
        if relevant.is_empty() {
            warn!("no relevant targets declared; the generated pipeline will be empty");
        }

        let excluded: HashSet<&str> = irrelevant.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let mut reduced = Vec::new();

        for entry in relevant {
            let closure = planner.closure(&[entry.as_str()])?;
            for target in closure.iter() {
                if seen.insert(target.name.as_str()) {
                    reduced.push(target);
                }
            }
        }

        reduced.retain(|target| !excluded.contains(target.name.as_str()));
        Ok(ExecutionPlan::new(reduced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::{PlanError, Target, TargetGraph};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn chain() -> TargetGraph<()> {
        TargetGraph::new(vec![
            Target::new("A"),
            Target::new("B").depends_on("A"),
            Target::new("C").depends_on("B"),
        ])
        .unwrap()
    }

    fn fan() -> TargetGraph<()> {
        TargetGraph::new(vec![
            Target::new("Restore"),
            Target::new("Compile").depends_on("Restore"),
            Target::new("Test").depends_on("Compile"),
            Target::new("Pack").depends_on("Compile"),
            Target::new("Publish").depends_on("Pack").depends_on("Test"),
        ])
        .unwrap()
    }

    #[test]
    fn test_chain_reduces_in_dependency_order() {
        let g = chain();
        let plan = PlanReducer::reduce(&g, &names(&["C"]), &[]).unwrap();
        assert_eq!(plan.names(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_irrelevant_target_is_excluded() {
        let g = chain();
        let plan = PlanReducer::reduce(&g, &names(&["C"]), &names(&["A"])).unwrap();
        assert_eq!(plan.names(), vec!["B", "C"]);
    }

    #[test]
    fn test_shared_dependencies_appear_once() {
        let g = fan();
        let plan = PlanReducer::reduce(&g, &names(&["Test", "Pack"]), &[]).unwrap();
        assert_eq!(plan.names(), vec!["Restore", "Compile", "Test", "Pack"]);
    }

    #[test]
    fn test_exclusion_is_absolute_across_entries() {
        let g = fan();
        let plan =
            PlanReducer::reduce(&g, &names(&["Test", "Pack", "Publish"]), &names(&["Compile"]))
                .unwrap();
        assert!(!plan.contains("Compile"));
        assert_eq!(plan.names(), vec!["Restore", "Test", "Pack", "Publish"]);
    }

    #[test]
    fn test_reduce_is_repeatable() {
        let g = fan();
        let relevant = names(&["Publish", "Test"]);
        let first = PlanReducer::reduce(&g, &relevant, &[]).unwrap();
        let second = PlanReducer::reduce(&g, &relevant, &[]).unwrap();
        assert_eq!(first.names(), second.names());
        assert_eq!(first.digest(), second.digest());
    }

    #[test]
    fn test_subset_of_entries_is_subsequence() {
        let g = fan();
        let small = PlanReducer::reduce(&g, &names(&["Pack"]), &[]).unwrap();
        let large = PlanReducer::reduce(&g, &names(&["Pack", "Test", "Publish"]), &[]).unwrap();

        let large_names = large.names();
        let mut cursor = large_names.iter();
        for name in small.names() {
            assert!(
                cursor.any(|n| *n == name),
                "{name} out of order in {large_names:?}"
            );
        }
    }

    #[test]
    fn test_empty_relevant_yields_empty_plan() {
        let g = fan();
        let plan = PlanReducer::reduce(&g, &[], &[]).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_unknown_entry_propagates_planner_error() {
        let g = chain();
        let err = PlanReducer::reduce(&g, &names(&["Nope"]), &[]).unwrap_err();
        assert!(matches!(err, PlanError::TargetNotFound { .. }));
    }
}
