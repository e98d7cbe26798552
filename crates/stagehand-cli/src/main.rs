//! Stagehand - target-graph build runner CLI
//!
//! The `stagehand` command loads a build definition, keeps generated CI
//! configuration files up to date and checks the execution plan of the
//! requested targets against the build state.
//!
//! ## Usage
//!
//! - `stagehand Publish --param api_key=...`: plan `Publish` and run the
//!   pre-flight requirement gate
//! - `stagehand --generate-configuration GitHubActions_staging --host GitHubActions`:
//!   regenerate one host's file
//! - `stagehand --list-hosts`: show declared CI hosts

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};

use stagehand_ci::{
    auto_generated, generate, generate_all, GenerateOptions, HostDeclarations, ToolIdentity,
};
use stagehand_core::{
    BuildDefinition, DependencyClosure, ParameterState, RequirementValidator, TargetGraph,
};

#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Target-graph build runner with CI configuration generation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Build definition file
    #[arg(short, long, default_value = "stagehand.toml")]
    build: PathBuf,

    /// Override a build parameter (key=value), repeatable
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Targets to plan
    targets: Vec<String>,

    /// Regenerate the configuration of one CI host id and exit
    #[arg(long, value_name = "ID")]
    generate_configuration: Option<String>,

    /// Host name the id passed to --generate-configuration must belong to
    #[arg(long = "host", value_name = "NAME", requires = "generate_configuration")]
    host_name: Option<String>,

    /// Skip regenerating auto-generated CI configurations
    #[arg(long)]
    no_auto_generate: bool,

    /// List declared CI hosts and exit
    #[arg(long)]
    list_hosts: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    stagehand_core::init_tracing(cli.json, level);

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let mut definition = BuildDefinition::load(&cli.build)
        .with_context(|| format!("Failed to load build definition {}", cli.build.display()))?;
    for param in &cli.params {
        definition
            .state
            .apply_override(param)
            .with_context(|| format!("Invalid --param '{param}'"))?;
    }
    let hosts = HostDeclarations::load(&cli.build)
        .with_context(|| format!("Failed to load CI hosts from {}", cli.build.display()))?;
    let tool = ToolIdentity::default();

    if cli.list_hosts {
        return cmd_list_hosts(&hosts, cli.json);
    }

    if let Some(host_id) = cli.generate_configuration.as_deref() {
        return cmd_generate_configuration(
            &definition,
            &hosts,
            &tool,
            host_id,
            cli.host_name.as_deref(),
        );
    }

    let BuildDefinition { graph, state } = definition;
    let graph = Arc::new(graph);

    if !cli.no_auto_generate {
        regenerate_auto_generated(&hosts, Arc::clone(&graph), &tool).await;
    }

    cmd_plan(&cli.build, &graph, &state, &cli.targets)
}

fn cmd_list_hosts(hosts: &HostDeclarations, json: bool) -> Result<()> {
    let generators = hosts.generators::<ParameterState>();

    if json {
        let listing: Vec<serde_json::Value> = generators
            .iter()
            .map(|generator| {
                let host = generator.host();
                serde_json::json!({
                    "id": host.id(),
                    "display_name": host.display_name(),
                    "auto_generate": host.auto_generate,
                    "relevant_targets": host.relevant_targets,
                    "irrelevant_targets": host.irrelevant_targets,
                    "generated_files": generator
                        .generated_files()
                        .iter()
                        .map(|f| f.display().to_string())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if generators.is_empty() {
        println!("No CI hosts declared.");
        return Ok(());
    }
    for generator in &generators {
        let host = generator.host();
        println!(
            "{:<28} {:<32} auto_generate={}",
            host.id(),
            host.display_name(),
            host.auto_generate
        );
        for file in generator.generated_files() {
            println!("    {}", file.display());
        }
    }
    Ok(())
}

fn cmd_generate_configuration(
    definition: &BuildDefinition,
    hosts: &HostDeclarations,
    tool: &ToolIdentity,
    host_id: &str,
    host_name: Option<&str>,
) -> Result<()> {
    let generator = hosts
        .find::<ParameterState>(host_id, host_name)
        .with_context(|| match host_name {
            Some(name) => format!("No CI host '{host_id}' declared for host '{name}'"),
            None => format!("No CI host '{host_id}' declared"),
        })?;

    let report = generate(
        generator.as_ref(),
        &definition.graph,
        tool,
        GenerateOptions { force: true },
    )?;

    println!(
        "Generated {} ({} targets)",
        report.configuration_file.display(),
        report.targets.len()
    );
    println!("Plan digest: {}", report.plan_digest);
    Ok(())
}

async fn regenerate_auto_generated(
    hosts: &HostDeclarations,
    graph: Arc<TargetGraph<ParameterState>>,
    tool: &ToolIdentity,
) {
    let generators = auto_generated(&hosts.generators::<ParameterState>());
    if generators.is_empty() {
        return;
    }

    let outcomes = generate_all(generators, graph, tool.clone(), GenerateOptions::default()).await;
    for outcome in outcomes {
        match outcome.result {
            Ok(report) => info!(
                host_id = %outcome.host_id,
                file = %report.configuration_file.display(),
                "CI configuration up to date"
            ),
            Err(err) => warn!(host_id = %outcome.host_id, error = %err, "CI configuration not generated"),
        }
    }
}

fn cmd_plan(
    build: &Path,
    graph: &TargetGraph<ParameterState>,
    state: &ParameterState,
    targets: &[String],
) -> Result<()> {
    if targets.is_empty() {
        println!("No targets requested. Targets in {}:", build.display());
        for target in graph.targets() {
            match &target.description {
                Some(description) => println!("  {:<24} {}", target.name, description),
                None => println!("  {}", target.name),
            }
        }
        return Ok(());
    }

    let entries: Vec<&str> = targets.iter().map(String::as_str).collect();
    let plan = graph
        .closure(&entries)
        .context("Failed to resolve execution plan")?;

    RequirementValidator::validate(&plan, state).context("Pre-flight requirement check failed")?;

    println!("Execution plan:");
    for (step, name) in plan.names().iter().enumerate() {
        println!("  {}. {}", step + 1, name);
    }
    println!("Plan digest: {}", plan.digest());
    Ok(())
}
