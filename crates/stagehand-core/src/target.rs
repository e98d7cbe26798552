//! Named units of build work.

use std::fmt;

use crate::requirement::Requirement;

/// A named unit of build work with declared dependencies and requirements.
///
/// Targets are immutable once registered in a [`crate::graph::TargetGraph`].
pub struct Target<S> {
    /// Unique target name.
    pub name: String,
    /// Optional one-line description shown in listings.
    pub description: Option<String>,
    /// Names of targets that must run before this one, in declaration order.
    pub depends_on: Vec<String>,
    /// Preconditions checked by the pre-flight gate, in declaration order.
    pub requirements: Vec<Requirement<S>>,
}

impl<S> Target<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            depends_on: Vec::new(),
            requirements: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.depends_on.push(dependency.into());
        self
    }

    pub fn requires(mut self, requirement: Requirement<S>) -> Self {
        self.requirements.push(requirement);
        self
    }
}

impl<S> Clone for Target<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            depends_on: self.depends_on.clone(),
            requirements: self.requirements.clone(),
        }
    }
}

impl<S> fmt::Debug for Target<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("depends_on", &self.depends_on)
            .field("requirements", &self.requirements)
            .finish()
    }
}
