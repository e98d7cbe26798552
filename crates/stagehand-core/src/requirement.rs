//! Requirement declarations checked before any target body runs.
//!
//! A requirement is a closed set of shapes. Each carries the text used in
//! violation messages and an accessor closure resolved against the build
//! state `S` when the pre-flight gate runs.

use std::fmt;
use std::sync::Arc;

use crate::error::RequirementKind;

/// Boxed check evaluated against the build state.
pub type StateCheck<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// A precondition declared by a target.
pub enum Requirement<S> {
    /// A boolean expression with its source text.
    Predicate { source: String, check: StateCheck<S> },

    /// A named field on the build state that must be present.
    FieldPresence { name: String, present: StateCheck<S> },

    /// A named computed property on the build state that must be present.
    PropertyPresence { name: String, present: StateCheck<S> },
}

impl<S> Requirement<S> {
    /// Declare a predicate requirement.
    pub fn predicate<F>(source: impl Into<String>, check: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Requirement::Predicate {
            source: source.into(),
            check: Arc::new(check),
        }
    }

    /// Declare that the field read by `accessor` must not be `None`.
    pub fn field<T, F>(name: impl Into<String>, accessor: F) -> Self
    where
        T: ?Sized,
        F: Fn(&S) -> Option<&T> + Send + Sync + 'static,
    {
        Requirement::FieldPresence {
            name: name.into(),
            present: Arc::new(move |state: &S| accessor(state).is_some()),
        }
    }

    /// Declare that the property computed by `accessor` must not be `None`.
    pub fn property<T, F>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&S) -> Option<T> + Send + Sync + 'static,
    {
        Requirement::PropertyPresence {
            name: name.into(),
            present: Arc::new(move |state: &S| accessor(state).is_some()),
        }
    }

    pub fn kind(&self) -> RequirementKind {
        match self {
            Requirement::Predicate { .. } => RequirementKind::Predicate,
            Requirement::FieldPresence { .. } => RequirementKind::Field,
            Requirement::PropertyPresence { .. } => RequirementKind::Property,
        }
    }

    /// Predicate source text, or the field/property name.
    pub fn description(&self) -> &str {
        match self {
            Requirement::Predicate { source, .. } => source,
            Requirement::FieldPresence { name, .. } | Requirement::PropertyPresence { name, .. } => {
                name
            }
        }
    }

    /// Evaluate this requirement against `state`.
    pub fn is_satisfied(&self, state: &S) -> bool {
        match self {
            Requirement::Predicate { check, .. } => check(state),
            Requirement::FieldPresence { present, .. }
            | Requirement::PropertyPresence { present, .. } => present(state),
        }
    }
}

impl<S> Clone for Requirement<S> {
    fn clone(&self) -> Self {
        match self {
            Requirement::Predicate { source, check } => Requirement::Predicate {
                source: source.clone(),
                check: Arc::clone(check),
            },
            Requirement::FieldPresence { name, present } => Requirement::FieldPresence {
                name: name.clone(),
                present: Arc::clone(present),
            },
            Requirement::PropertyPresence { name, present } => Requirement::PropertyPresence {
                name: name.clone(),
                present: Arc::clone(present),
            },
        }
    }
}

impl<S> fmt::Debug for Requirement<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requirement")
            .field("kind", &self.kind())
            .field("description", &self.description())
            .finish()
    }
}
