//! GitHub Actions workflow generation.

use stagehand_core::ExecutionPlan;

use crate::generator::{ConfigurationEntity, ConfigurationGenerator};
use crate::host::HostConfiguration;
use crate::hosts::build_invocation;
use crate::writer::{CommentSyntax, ConfigWriter};

pub const HOST_NAME: &str = "GitHubActions";

/// Workflow with one job whose steps run the reduced plan in order.
pub struct GitHubActions {
    host: HostConfiguration,
    build_command: String,
    branches: Vec<String>,
    runs_on: String,
}

impl GitHubActions {
    pub fn new(host: HostConfiguration, build_command: impl Into<String>) -> Self {
        Self {
            host,
            build_command: build_command.into(),
            branches: vec!["main".to_string()],
            runs_on: "ubuntu-latest".to_string(),
        }
    }

    /// Branches whose pushes trigger the workflow. Empty keeps the default.
    pub fn with_branches(mut self, branches: Vec<String>) -> Self {
        if !branches.is_empty() {
            self.branches = branches;
        }
        self
    }

    pub fn with_runner(mut self, runs_on: impl Into<String>) -> Self {
        self.runs_on = runs_on.into();
        self
    }
}

impl<S> ConfigurationGenerator<S> for GitHubActions {
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
        let steps = plan
            .iter()
            .map(|target| WorkflowStep {
                name: format!("Run: {}", target.name),
                run: build_invocation(&self.build_command, &target.name),
            })
            .collect();
        Ok(Box::new(Workflow {
            name: self.host.display_name(),
            branches: self.branches.clone(),
            runs_on: self.runs_on.clone(),
            steps,
        }))
    }
}

struct WorkflowStep {
    name: String,
    run: String,
}

struct Workflow {
    name: String,
    branches: Vec<String>,
    runs_on: String,
    steps: Vec<WorkflowStep>,
}

impl ConfigurationEntity for Workflow {
    fn write(&self, w: &mut ConfigWriter<'_>) -> std::io::Result<()> {
        w.write_line(&format!("name: {}", yaml_quote(&self.name)))?;
        w.write_blank_line()?;
        w.write_line("on:")?;
        w.indented(|w| {
            w.write_line("push:")?;
            w.indented(|w| {
                w.write_line("branches:")?;
                w.indented(|w| {
                    for branch in &self.branches {
                        w.write_line(&format!("- {}", yaml_quote(branch)))?;
                    }
                    Ok(())
                })
            })?;
            w.write_line("pull_request:")
        })?;
        w.write_blank_line()?;
        w.write_line("jobs:")?;
        w.indented(|w| {
            w.write_line("build:")?;
            w.indented(|w| {
                w.write_line(&format!("runs-on: {}", self.runs_on))?;
                w.write_line("steps:")?;
                w.indented(|w| {
                    w.write_line("- uses: actions/checkout@v4")?;
                    for step in &self.steps {
                        w.write_line(&format!("- name: {}", yaml_quote(&step.name)))?;
                        w.indented(|w| w.write_line(&format!("run: {}", yaml_quote(&step.run))))?;
                    }
                    Ok(())
                })
            })
        })
    }
}

/// Single-quote a YAML scalar.
pub(crate) fn yaml_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::test_support::render;
    use stagehand_core::{DependencyClosure, Target, TargetGraph};

    #[test]
    fn test_workflow_lists_steps_in_plan_order() {
        let graph: TargetGraph<()> = TargetGraph::new(vec![
            Target::new("Restore"),
            Target::new("Compile").depends_on("Restore"),
        ])
        .unwrap();
        let plan = graph.closure(&["Compile"]).unwrap();
        let host = GitHubActions::new(
            HostConfiguration::new(HOST_NAME, "ci.yml").with_postfix("staging"),
            "./build.sh",
        )
        .with_branches(vec!["release".to_string()]);

        let out = render(&host, &plan);
        let expected = "\
name: 'GitHubActions (staging)'

on:
  push:
    branches:
      - 'release'
  pull_request:

jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: 'Run: Restore'
        run: './build.sh Restore'
      - name: 'Run: Compile'
        run: './build.sh Compile'
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_target_names_with_yaml_and_shell_syntax_are_quoted() {
        let graph: TargetGraph<()> = TargetGraph::new(vec![Target::new("Pack: nuget")]).unwrap();
        let plan = graph.closure(&["Pack: nuget"]).unwrap();
        let host = GitHubActions::new(HostConfiguration::new(HOST_NAME, "ci.yml"), "./build.sh");

        let out = render(&host, &plan);
        assert!(out.contains("      - name: 'Run: Pack: nuget'\n"));
        assert!(out.contains("        run: './build.sh ''Pack: nuget'''\n"));
    }

    #[test]
    fn test_yaml_quote_escapes_single_quotes() {
        assert_eq!(yaml_quote("it's"), "'it''s'");
    }
}
