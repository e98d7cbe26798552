//! Target dependency graph and dependency-closure planning.
//!
//! An edge `A -> B` in [`Target::depends_on`] means "A depends on B": B must
//! run before A. Closures are computed with a post-order DFS so that every
//! target appears after all of its dependencies, with sibling dependencies
//! visited in declaration order.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{PlanError, PlanResult};
use crate::obs;
use crate::plan::ExecutionPlan;
use crate::target::Target;

/// Computes the ordered dependency closure of a set of entry targets.
///
/// Implementations must return a duplicate-free sequence in which every
/// target follows its dependencies, and must reject unknown entry names.
pub trait DependencyClosure<S> {
    fn closure(&self, entries: &[&str]) -> PlanResult<ExecutionPlan<'_, S>>;
}

/// Validated, immutable set of targets indexed by name.
pub struct TargetGraph<S> {
    targets: Vec<Target<S>>,
    index: HashMap<String, usize>,
}

impl<S> TargetGraph<S> {
    /// Build a graph, rejecting duplicate names, unknown dependencies and cycles.
    pub fn new(targets: Vec<Target<S>>) -> PlanResult<Self> {
        let mut index = HashMap::with_capacity(targets.len());
        for (position, target) in targets.iter().enumerate() {
            if index.insert(target.name.clone(), position).is_some() {
                return Err(PlanError::DuplicateTarget {
                    name: target.name.clone(),
                });
            }
        }

        for target in &targets {
            for dependency in &target.depends_on {
                if !index.contains_key(dependency) {
                    return Err(PlanError::UnknownDependency {
                        target: target.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        let graph = Self { targets, index };
        if let Some(cycle) = graph.find_cycle() {
            return Err(PlanError::DependencyCycle { targets: cycle });
        }
        Ok(graph)
    }

    /// Look up a target by name.
    pub fn get(&self, name: &str) -> Option<&Target<S>> {
        self.index.get(name).map(|&i| &self.targets[i])
    }

    /// All targets in registration order.
    pub fn targets(&self) -> &[Target<S>] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Direct dependencies of `name`, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> PlanResult<Vec<&Target<S>>> {
        let target = self.get(name).ok_or_else(|| PlanError::TargetNotFound {
            name: name.to_string(),
        })?;
        Ok(target
            .depends_on
            .iter()
            .filter_map(|dep| self.get(dep))
            .collect())
    }

    fn visit<'g>(
        &'g self,
        position: usize,
        visited: &mut HashSet<usize>,
        out: &mut Vec<&'g Target<S>>,
    ) {
        if !visited.insert(position) {
            return;
        }
        let target = &self.targets[position];
        for dependency in &target.depends_on {
            // Dependencies were checked in `new`.
            if let Some(&dep) = self.index.get(dependency) {
                self.visit(dep, visited, out);
            }
        }
        out.push(target);
    }

    /// DFS with an explicit path stack. Returns the cycle path if found.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut done = HashSet::new();
        for start in 0..self.targets.len() {
            let mut path = Vec::new();
            if self.dfs_cycle(start, &mut done, &mut path) {
                // `path` ends with the repeated node; drop the lead-in before it.
                let repeated = path.last().copied()?;
                let entry = path.iter().position(|&i| i == repeated)?;
                return Some(
                    path[entry..]
                        .iter()
                        .map(|&i| self.targets[i].name.clone())
                        .collect(),
                );
            }
        }
        None
    }

    fn dfs_cycle(&self, node: usize, done: &mut HashSet<usize>, path: &mut Vec<usize>) -> bool {
        if path.contains(&node) {
            path.push(node);
            return true;
        }
        if done.contains(&node) {
            return false;
        }
        path.push(node);
        for dependency in &self.targets[node].depends_on {
            if let Some(&dep) = self.index.get(dependency) {
                if self.dfs_cycle(dep, done, path) {
                    return true;
                }
            }
        }
        path.pop();
        done.insert(node);
        false
    }
}

impl<S> DependencyClosure<S> for TargetGraph<S> {
    fn closure(&self, entries: &[&str]) -> PlanResult<ExecutionPlan<'_, S>> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        for entry in entries {
            let &position = self
                .index
                .get(*entry)
                .ok_or_else(|| PlanError::TargetNotFound {
                    name: entry.to_string(),
                })?;
            self.visit(position, &mut visited, &mut out);
        }
        let plan = ExecutionPlan::new(out);
        obs::emit_plan_resolved(entries, plan.len(), &plan.digest());
        Ok(plan)
    }
}

impl<S> fmt::Debug for TargetGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetGraph")
            .field("targets", &self.targets)
            .finish()
    }
}
