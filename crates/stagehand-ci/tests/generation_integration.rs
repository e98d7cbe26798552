//! Integration tests: build definition + host declarations -> generated files.

use stagehand_ci::{
    auto_generated, generate, generate_all, is_generated, GenerateOptions, GenerationStage,
    HostDeclarations, ToolIdentity,
};
use stagehand_core::{BuildDefinition, ParameterState};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const DEFINITION: &str = r#"
[parameters]
configuration = "Release"

[[target]]
name = "Restore"

[[target]]
name = "Compile"
depends_on = ["Restore"]

[[target]]
name = "Test"
depends_on = ["Compile"]

[[target]]
name = "Pack"
depends_on = ["Compile"]

[[target]]
name = "Publish"
depends_on = ["Pack", "Test"]
requires = [{ field = "api_key" }]

[[host]]
kind = "github-actions"
postfix = "staging"
relevant_targets = ["Test", "Pack"]
irrelevant_targets = ["Restore"]

[[host]]
kind = "gitlab"
relevant_targets = ["Publish"]

[[host]]
kind = "teamcity"
relevant_targets = ["Deploy"]

[[host]]
kind = "gitlab"
postfix = "manual"
file = "ci/manual.yml"
relevant_targets = ["Test"]
auto_generate = false
"#;

fn load(root: &Path) -> (BuildDefinition, HostDeclarations) {
    let definition = BuildDefinition::from_toml_str(DEFINITION, BTreeMap::new()).unwrap();
    let hosts = HostDeclarations::from_toml_str(DEFINITION, root.to_path_buf()).unwrap();
    (definition, hosts)
}

/// Test: one failing host does not stop the others
#[tokio::test]
async fn test_generate_all_isolates_host_failures() {
    let dir = tempfile::tempdir().unwrap();
    let (definition, hosts) = load(dir.path());
    let generators = auto_generated(&hosts.generators::<ParameterState>());
    assert_eq!(generators.len(), 3, "manual host should be skipped");

    let outcomes = generate_all(
        generators,
        Arc::new(definition.graph),
        ToolIdentity::default(),
        GenerateOptions::default(),
    )
    .await;

    let ids: Vec<&str> = outcomes.iter().map(|o| o.host_id.as_str()).collect();
    assert_eq!(ids, vec!["GitHubActions_staging", "GitLab", "TeamCity"]);

    let github = outcomes[0].result.as_ref().expect("github generation failed");
    assert_eq!(github.targets, vec!["Compile", "Test", "Pack"]);

    let gitlab = outcomes[1].result.as_ref().expect("gitlab generation failed");
    assert_eq!(
        gitlab.targets,
        vec!["Restore", "Compile", "Pack", "Test", "Publish"]
    );

    let err = outcomes[2].result.as_ref().unwrap_err();
    assert_eq!(err.host_id, "TeamCity");
    assert_eq!(err.stage, GenerationStage::PlanReducing);
    assert!(!dir.path().join(".teamcity/settings.kts").exists());

    assert!(dir.path().join(".gitlab-ci.yml").exists());
    assert!(!dir.path().join("ci/manual.yml").exists());
}

/// Test: postfixed host identity flows into the header and workflow name
#[tokio::test]
async fn test_postfixed_host_identity_in_generated_file() {
    let dir = tempfile::tempdir().unwrap();
    let (definition, hosts) = load(dir.path());
    let generator = hosts
        .find::<ParameterState>("GitHubActions_staging", Some("GitHubActions"))
        .expect("host not declared");

    assert_eq!(generator.host().display_name(), "GitHubActions (staging)");

    let report = generate(
        generator.as_ref(),
        &definition.graph,
        &ToolIdentity::default(),
        GenerateOptions::default(),
    )
    .unwrap();

    let content = fs::read_to_string(&report.configuration_file).unwrap();
    assert_eq!(
        report.configuration_file,
        dir.path().join(".github/workflows/githubactions_staging.yml")
    );
    assert!(is_generated(&content));
    assert!(content.contains(
        "#         stagehand --generate-configuration GitHubActions_staging --host GitHubActions\n"
    ));
    assert!(content.contains("#         [GitHubActions (AutoGenerate = false)]\n"));
    assert!(content.contains("name: 'GitHubActions (staging)'\n"));
    assert!(!content.contains("Restore"));
}

/// Test: identical inputs produce byte-identical files and digests
#[tokio::test]
async fn test_regeneration_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let (definition, hosts) = load(dir.path());
    let graph = Arc::new(definition.graph);

    let first = generate_all(
        hosts.generators::<ParameterState>(),
        Arc::clone(&graph),
        ToolIdentity::default(),
        GenerateOptions::default(),
    )
    .await;
    let gitlab = fs::read_to_string(dir.path().join(".gitlab-ci.yml")).unwrap();

    let second = generate_all(
        hosts.generators::<ParameterState>(),
        graph,
        ToolIdentity::default(),
        GenerateOptions::default(),
    )
    .await;

    assert_eq!(
        fs::read_to_string(dir.path().join(".gitlab-ci.yml")).unwrap(),
        gitlab
    );
    for (a, b) in first.iter().zip(&second) {
        match (&a.result, &b.result) {
            (Ok(a), Ok(b)) => assert_eq!(a.plan_digest, b.plan_digest),
            (Err(a), Err(b)) => assert_eq!(a.stage, b.stage),
            _ => panic!("outcome changed between runs for {}", a.host_id),
        }
    }
}
