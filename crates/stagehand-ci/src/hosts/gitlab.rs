//! GitLab CI pipeline generation.

use stagehand_core::ExecutionPlan;

use crate::generator::{ConfigurationEntity, ConfigurationGenerator};
use crate::host::HostConfiguration;
use crate::hosts::build_invocation;
use crate::hosts::github::yaml_quote;
use crate::writer::{CommentSyntax, ConfigWriter};

pub const HOST_NAME: &str = "GitLab";

/// Top-level keys GitLab reads as pipeline settings rather than jobs.
const RESERVED_KEYS: &[&str] = &[
    "after_script",
    "before_script",
    "cache",
    "default",
    "image",
    "include",
    "services",
    "stages",
    "variables",
    "workflow",
];

/// Pipeline with one stage and one job per reduced target.
///
/// `needs:` only names dependencies that survived reduction, so excluded
/// targets never appear as job edges.
pub struct GitLab {
    host: HostConfiguration,
    build_command: String,
    image: Option<String>,
}

impl GitLab {
    pub fn new(host: HostConfiguration, build_command: impl Into<String>) -> Self {
        Self {
            host,
            build_command: build_command.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }
}

impl<S> ConfigurationGenerator<S> for GitLab {
    fn host(&self) -> &HostConfiguration {
        &self.host
    }

    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::Hash
    }

    fn build_configuration(
        &self,
        plan: &ExecutionPlan<'_, S>,
    ) -> anyhow::Result<Box<dyn ConfigurationEntity>> {
        let mut jobs = Vec::with_capacity(plan.len());
        for target in plan.iter() {
            if RESERVED_KEYS.contains(&target.name.as_str()) {
                anyhow::bail!(
                    "target '{}' collides with a reserved GitLab CI keyword",
                    target.name
                );
            }
            if target.name.starts_with('.') {
                anyhow::bail!(
                    "target '{}' would be read as a hidden GitLab CI job",
                    target.name
                );
            }
            jobs.push(Job {
                name: target.name.clone(),
                needs: target
                    .depends_on
                    .iter()
                    .filter(|dep| plan.contains(dep))
                    .cloned()
                    .collect(),
                script: build_invocation(&self.build_command, &target.name),
            });
        }
        Ok(Box::new(Pipeline {
            image: self.image.clone(),
            jobs,
        }))
    }
}

struct Job {
    name: String,
    needs: Vec<String>,
    script: String,
}

struct Pipeline {
    image: Option<String>,
    jobs: Vec<Job>,
}

impl ConfigurationEntity for Pipeline {
    fn write(&self, w: &mut ConfigWriter<'_>) -> std::io::Result<()> {
        if let Some(image) = &self.image {
            w.write_line(&format!("image: {image}"))?;
            w.write_blank_line()?;
        }

        w.write_line("stages:")?;
        w.indented(|w| {
            for job in &self.jobs {
                w.write_line(&format!("- {}", yaml_quote(&job.name)))?;
            }
            Ok(())
        })?;

        for job in &self.jobs {
            w.write_blank_line()?;
            w.write_line(&format!("{}:", yaml_quote(&job.name)))?;
            w.indented(|w| {
                w.write_line(&format!("stage: {}", yaml_quote(&job.name)))?;
                if !job.needs.is_empty() {
                    w.write_line("needs:")?;
                    w.indented(|w| {
                        for need in &job.needs {
                            w.write_line(&format!("- {}", yaml_quote(need)))?;
                        }
                        Ok(())
                    })?;
                }
                w.write_line("script:")?;
                w.indented(|w| w.write_line(&format!("- {}", yaml_quote(&job.script))))
            })?;
        }
        Ok(())
    }
}
