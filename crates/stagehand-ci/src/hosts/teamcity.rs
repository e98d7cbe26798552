//! TeamCity Kotlin DSL settings generation.

use stagehand_core::ExecutionPlan;

use crate::generator::{ConfigurationEntity, ConfigurationGenerator};
use crate::host::HostConfiguration;
use crate::hosts::build_invocation;
use crate::writer::{CommentSyntax, ConfigWriter};

pub const HOST_NAME: &str = "TeamCity";

const DSL_VERSION: &str = "2019.2";

/// Kotlin hard keywords; identifiers spelled like these are backtick-quoted.
const KOTLIN_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

/// Project with one build type per reduced target, chained through
/// snapshot dependencies.
pub struct TeamCity {
    host: HostConfiguration,
    build_command: String,
}

impl TeamCity {
    pub fn new(host: HostConfiguration, build_command: impl Into<String>) -> Self {
        Self {
            host,
            build_command: build_command.into(),
        }
    }
}

impl<S> ConfigurationGenerator<S> for TeamCity {
    fn host(&self) -> &HostConfiguration {
        &self.host
    }

    fn comment_syntax(&self) -> CommentSyntax {
        CommentSyntax::DoubleSlash
    }

    fn indent_width(&self) -> usize {
        4
    }

    fn build_configuration(
        &self,
        plan: &ExecutionPlan<'_, S>,
    ) -> anyhow::Result<Box<dyn ConfigurationEntity>> {
        let mut build_types = Vec::with_capacity(plan.len());
        for target in plan.iter() {
            let id = kotlin_identifier(&target.name);
            if build_types.iter().any(|b: &BuildType| b.id == id) {
                anyhow::bail!(
                    "target '{}' maps to Kotlin identifier '{}' already used by another target",
                    target.name,
                    id
                );
            }
            build_types.push(BuildType {
                id,
                name: target.name.clone(),
                script: build_invocation(&self.build_command, &target.name),
                snapshots: target
                    .depends_on
                    .iter()
                    .filter(|dep| plan.contains(dep))
                    .map(|dep| kotlin_identifier(dep))
                    .collect(),
            });
        }
        Ok(Box::new(Settings { build_types }))
    }
}

struct BuildType {
    id: String,
    name: String,
    script: String,
    snapshots: Vec<String>,
}

struct Settings {
    build_types: Vec<BuildType>,
}

impl ConfigurationEntity for Settings {
    fn write(&self, w: &mut ConfigWriter<'_>) -> std::io::Result<()> {
        w.write_line(&format!(
            "import jetbrains.buildServer.configs.kotlin.v{}.*",
            DSL_VERSION.replace('.', "_")
        ))?;
        w.write_blank_line()?;
        w.write_line(&format!("version = \"{DSL_VERSION}\""))?;
        w.write_blank_line()?;
        w.write_line("project {")?;
        w.indented(|w| {
            for build_type in &self.build_types {
                w.write_line(&format!("buildType({})", build_type.id))?;
            }
            Ok(())
        })?;
        w.write_line("}")?;

        for build_type in &self.build_types {
            w.write_blank_line()?;
            w.write_line(&format!("object {} : BuildType({{", build_type.id))?;
            w.indented(|w| {
                w.write_line(&format!("name = {}", kotlin_string(&build_type.name)))?;
                w.write_line("steps {")?;
                w.indented(|w| {
                    w.write_line("script {")?;
                    w.indented(|w| {
                        w.write_line(&format!(
                            "scriptContent = {}",
                            kotlin_string(&build_type.script)
                        ))
                    })?;
                    w.write_line("}")
                })?;
                w.write_line("}")?;
                if !build_type.snapshots.is_empty() {
                    w.write_line("dependencies {")?;
                    w.indented(|w| {
                        for snapshot in &build_type.snapshots {
                            w.write_line(&format!("snapshot({snapshot}) {{}}"))?;
                        }
                        Ok(())
                    })?;
                    w.write_line("}")?;
                }
                Ok(())
            })?;
            w.write_line("})")?;
        }
        Ok(())
    }
}

/// Map a target name onto a Kotlin identifier.
fn kotlin_identifier(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if id.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    if KOTLIN_KEYWORDS.contains(&id.as_str()) {
        return format!("`{id}`");
    }
    id
}

fn kotlin_string(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::test_support::render;
    use stagehand_core::{DependencyClosure, Target, TargetGraph};

    #[test]
    fn test_build_types_chain_snapshot_dependencies() {
        let graph: TargetGraph<()> = TargetGraph::new(vec![
            Target::new("Compile"),
            Target::new("Pack-Nuget").depends_on("Compile"),
        ])
        .unwrap();
        let plan = graph.closure(&["Pack-Nuget"]).unwrap();
        let host = TeamCity::new(
            HostConfiguration::new(HOST_NAME, ".teamcity/settings.kts"),
            "./build.sh",
        );

        let out = render(&host, &plan);
        let expected = "\
import jetbrains.buildServer.configs.kotlin.v2019_2.*

version = \"2019.2\"

project {
    buildType(Compile)
    buildType(Pack_Nuget)
}

object Compile : BuildType({
    name = \"Compile\"
    steps {
        script {
            scriptContent = \"./build.sh Compile\"
        }
    }
})

object Pack_Nuget : BuildType({
    name = \"Pack-Nuget\"
    steps {
        script {
            scriptContent = \"./build.sh Pack-Nuget\"
        }
    }
    dependencies {
        snapshot(Compile) {}
    }
})
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_keyword_targets_are_backtick_quoted() {
        let graph: TargetGraph<()> = TargetGraph::new(vec![
            Target::new("class"),
            Target::new("object").depends_on("class"),
        ])
        .unwrap();
        let plan = graph.closure(&["object"]).unwrap();
        let host = TeamCity::new(HostConfiguration::new(HOST_NAME, "settings.kts"), "./build.sh");

        let out = render(&host, &plan);
        assert!(out.contains("    buildType(`class`)\n    buildType(`object`)\n"));
        assert!(out.contains("object `object` : BuildType({\n"));
        assert!(out.contains("        snapshot(`class`) {}\n"));
    }

    #[test]
    fn test_script_shell_quotes_target_name() {
        let graph: TargetGraph<()> = TargetGraph::new(vec![Target::new("Pack: nuget")]).unwrap();
        let plan = graph.closure(&["Pack: nuget"]).unwrap();
        let host = TeamCity::new(HostConfiguration::new(HOST_NAME, "settings.kts"), "./build.sh");

        let out = render(&host, &plan);
        assert!(out.contains("scriptContent = \"./build.sh 'Pack: nuget'\"\n"));
    }

    #[test]
    fn test_identifier_collisions_are_rejected() {
        let graph: TargetGraph<()> =
            TargetGraph::new(vec![Target::new("a-b"), Target::new("a_b")]).unwrap();
        let plan = graph.closure(&["a-b", "a_b"]).unwrap();
        let host = TeamCity::new(HostConfiguration::new(HOST_NAME, "settings.kts"), "./build.sh");
        let result = ConfigurationGenerator::<()>::build_configuration(&host, &plan);
        assert!(result.is_err());
    }

    #[test]
    fn test_kotlin_identifier_and_string() {
        assert_eq!(kotlin_identifier("2fa"), "_2fa");
        assert_eq!(kotlin_identifier("Pack.Nuget"), "Pack_Nuget");
        assert_eq!(kotlin_identifier("object"), "`object`");
        assert_eq!(kotlin_identifier("Object"), "Object");
        assert_eq!(kotlin_string("say \"$x\""), "\"say \\\"\\$x\\\"\"");
    }
}
