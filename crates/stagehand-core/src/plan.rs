//! Ordered execution plans.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::target::Target;

/// An ordered, duplicate-free sequence of targets borrowed from a graph.
pub struct ExecutionPlan<'g, S> {
    targets: Vec<&'g Target<S>>,
}

impl<'g, S> ExecutionPlan<'g, S> {
    /// Wrap an already ordered sequence.
    ///
    /// Callers are responsible for ordering; later duplicates are dropped.
    pub fn new(targets: Vec<&'g Target<S>>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let targets = targets
            .into_iter()
            .filter(|&t| seen.insert(t.name.as_str()))
            .collect();
        Self { targets }
    }

    pub fn targets(&self) -> &[&'g Target<S>] {
        &self.targets
    }

    pub fn iter(&self) -> impl Iterator<Item = &'g Target<S>> + '_ {
        self.targets.iter().copied()
    }

    pub fn names(&self) -> Vec<&'g str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.targets.iter().any(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// SHA-256 (hex) over the ordered target names.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for target in &self.targets {
            hasher.update(target.name.as_bytes());
            hasher.update(b"\0");
        }
        hex::encode(hasher.finalize())
    }
}

impl<'g, S> Clone for ExecutionPlan<'g, S> {
    fn clone(&self) -> Self {
        Self {
            targets: self.targets.clone(),
        }
    }
}

impl<'g, S> fmt::Debug for ExecutionPlan<'g, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
