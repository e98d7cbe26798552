//! Structured observability hooks for planning, validation and generation.
//!
//! This module provides:
//! - A host-scoped tracing span via the `HostSpan` RAII guard
//! - Emission functions for key lifecycle events: plan resolution, the
//!   requirement gate, and per-host configuration generation
//!
//! Events are emitted at `info!` level (filterable via `RUST_LOG`).

use tracing::{info, warn};

use crate::error::RequirementViolation;

/// RAII guard that enters a host-scoped span for the duration of a generation.
///
/// # Example
///
/// ```ignore
/// let _span = HostSpan::enter("GitHubActions_staging");
/// // all tracing calls are now associated with host_id = "GitHubActions_staging"
/// ```
pub struct HostSpan {
    _span: tracing::span::EnteredSpan,
}

impl HostSpan {
    pub fn enter(host_id: &str) -> Self {
        let span = tracing::info_span!("stagehand.host", host_id = %host_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: an execution plan was resolved for the given entry targets.
pub fn emit_plan_resolved(entries: &[&str], planned: usize, digest: &str) {
    info!(
        event = "plan.resolved",
        entries = ?entries,
        planned = planned,
        digest = %digest,
    );
}

/// Emit event: every requirement in the plan held.
pub fn emit_requirements_validated(targets: usize, requirements: usize) {
    info!(
        event = "requirements.validated",
        targets = targets,
        requirements = requirements,
    );
}

/// Emit event: the requirement gate stopped at a violation (warning level).
pub fn emit_requirement_violated(violation: &RequirementViolation) {
    warn!(
        event = "requirements.violated",
        target = %violation.target,
        kind = %violation.kind,
        description = %violation.description,
    );
}

/// Emit event: configuration generation started for a host.
pub fn emit_generation_started(host_id: &str, file: &str) {
    info!(event = "generation.started", host_id = %host_id, file = %file);
}

/// Emit event: configuration generation wrote its file.
pub fn emit_generation_finished(host_id: &str, planned: usize, digest: &str) {
    info!(
        event = "generation.finished",
        host_id = %host_id,
        planned = planned,
        digest = %digest,
    );
}

/// Emit event: configuration generation failed for a host (warning level).
pub fn emit_generation_failed(host_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "generation.failed", host_id = %host_id, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_span_create() {
        let _span = HostSpan::enter("GitHubActions");
        emit_generation_started("GitHubActions", ".github/workflows/ci.yml");
    }
}
