//! CI configuration generation orchestration.
//!
//! A single generation run is synchronous and ordered:
//!
//! 1. reduce the target graph with the host's relevant/irrelevant names,
//! 2. ask the host for its configuration entity,
//! 3. open (create or truncate) the configuration file,
//! 4. write the provenance header,
//! 5. serialize the entity.
//!
//! Files are written in place. A failure in step 4 or 5, or an interrupted
//! process, leaves a partial file behind; there is no atomic rename.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stagehand_core::obs::{self, HostSpan};
use stagehand_core::{DependencyClosure, ExecutionPlan, TargetGraph};
use tokio::task::JoinSet;

use crate::error::{GenerationError, GenerationResult, GenerationStage};
use crate::header::{is_generated, write_provenance_header};
use crate::host::{HostConfiguration, ToolIdentity};
use crate::reduce::PlanReducer;
use crate::writer::{CommentSyntax, ConfigWriter};

/// Host-specific in-memory pipeline, serialized once per generation run.
pub trait ConfigurationEntity: Send {
    fn write(&self, writer: &mut ConfigWriter<'_>) -> std::io::Result<()>;
}

/// A CI host able to turn a reduced plan into a configuration entity.
pub trait ConfigurationGenerator<S>: Send + Sync {
    fn host(&self) -> &HostConfiguration;

    /// Comment syntax of the generated file format.
    fn comment_syntax(&self) -> CommentSyntax;

    /// Indentation step of the generated file format.
    fn indent_width(&self) -> usize {
        2
    }

    /// Name under which this host is declared, shown in the provenance header.
    fn declaration_name(&self) -> &str {
        &self.host().host_name
    }

    /// Every file this host produces.
    fn generated_files(&self) -> Vec<PathBuf> {
        vec![self.host().configuration_file.clone()]
    }

    /// Build the pipeline for the reduced plan.
    fn build_configuration(
        &self,
        plan: &ExecutionPlan<'_, S>,
    ) -> anyhow::Result<Box<dyn ConfigurationEntity>>;
}

/// Options for a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Overwrite an existing file even if it carries no provenance banner.
    pub force: bool,
}

/// Outcome of a successful generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub host_id: String,
    pub configuration_file: PathBuf,
    /// Reduced plan, in the order written.
    pub targets: Vec<String>,
    /// Digest of the reduced plan.
    pub plan_digest: String,
}

/// Generate one host's configuration file.
pub fn generate<S, G, P>(
    generator: &G,
    planner: &P,
    tool: &ToolIdentity,
    options: GenerateOptions,
) -> GenerationResult<GenerationReport>
where
    G: ConfigurationGenerator<S> + ?Sized,
    P: DependencyClosure<S> + ?Sized,
{
    let host = generator.host();
    let host_id = host.id();
    let path = host.configuration_file.as_path();
    let _span = HostSpan::enter(&host_id);
    obs::emit_generation_started(&host_id, &path.display().to_string());

    let result = run_stages(generator, planner, tool, options, &host_id, path);
    match &result {
        Ok(report) => {
            obs::emit_generation_finished(&host_id, report.targets.len(), &report.plan_digest)
        }
        Err(err) => obs::emit_generation_failed(&host_id, err),
    }
    result
}

fn run_stages<S, G, P>(
    generator: &G,
    planner: &P,
    tool: &ToolIdentity,
    options: GenerateOptions,
    host_id: &str,
    path: &Path,
) -> GenerationResult<GenerationReport>
where
    G: ConfigurationGenerator<S> + ?Sized,
    P: DependencyClosure<S> + ?Sized,
{
    let host = generator.host();

    let plan = PlanReducer::reduce(planner, &host.relevant_targets, &host.irrelevant_targets)
        .map_err(fail(host_id, GenerationStage::PlanReducing))?;

    let entity = generator
        .build_configuration(&plan)
        .map_err(fail(host_id, GenerationStage::EntityBuilding))?;

    if !options.force {
        ensure_overwritable(path).map_err(fail(host_id, GenerationStage::StreamOpening))?;
    }
    let file = open_stream(path).map_err(fail(host_id, GenerationStage::StreamOpening))?;
    let mut stream = BufWriter::new(file);
    let mut writer = ConfigWriter::new(&mut stream, generator.comment_syntax())
        .with_indent_width(generator.indent_width());

    write_provenance_header(&mut writer, generator.declaration_name(), host, tool)
        .map_err(fail(host_id, GenerationStage::HeaderWriting))?;

    entity
        .write(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(fail(host_id, GenerationStage::ContentWriting))?;

    Ok(GenerationReport {
        host_id: host_id.to_string(),
        configuration_file: path.to_path_buf(),
        targets: plan.names().into_iter().map(str::to_string).collect(),
        plan_digest: plan.digest(),
    })
}

fn fail<E>(host_id: &str, stage: GenerationStage) -> impl FnOnce(E) -> GenerationError + '_
where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    move |source| GenerationError::new(host_id, stage, source)
}

/// Refuse to replace a non-empty file that lacks the provenance banner.
/// Content that is not UTF-8 counts as hand-written.
fn ensure_overwritable(path: &Path) -> std::io::Result<()> {
    match fs::read(path) {
        Ok(existing)
            if !existing.is_empty()
                && !std::str::from_utf8(&existing).map_or(false, is_generated) =>
        {
            Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!(
                    "{} exists and was not generated; pass force to overwrite",
                    path.display()
                ),
            ))
        }
        Ok(_) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

fn open_stream(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// Per-host outcome of [`generate_all`].
#[derive(Debug)]
pub struct HostOutcome {
    pub host_id: String,
    pub result: GenerationResult<GenerationReport>,
}

/// Generate several hosts concurrently, one blocking task per host.
///
/// Outcomes are returned in input order. A failing host does not affect
/// the others.
pub async fn generate_all<S>(
    generators: Vec<Arc<dyn ConfigurationGenerator<S>>>,
    graph: Arc<TargetGraph<S>>,
    tool: ToolIdentity,
    options: GenerateOptions,
) -> Vec<HostOutcome>
where
    S: Send + Sync + 'static,
{
    let mut ids = Vec::with_capacity(generators.len());
    let mut tasks = JoinSet::new();

    for (position, generator) in generators.into_iter().enumerate() {
        ids.push(generator.host().id());
        let graph = Arc::clone(&graph);
        let tool = tool.clone();
        tasks.spawn_blocking(move || {
            let result = generate(generator.as_ref(), graph.as_ref(), &tool, options);
            (position, result)
        });
    }

    let mut results: Vec<Option<GenerationResult<GenerationReport>>> =
        (0..ids.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        if let Ok((position, result)) = joined {
            results[position] = Some(result);
        }
    }

    ids.into_iter()
        .zip(results)
        .map(|(host_id, result)| {
            let result = result.unwrap_or_else(|| {
                Err(GenerationError::new(
                    host_id.clone(),
                    GenerationStage::TaskAborted,
                    "generation task panicked or was cancelled",
                ))
            });
            HostOutcome { host_id, result }
        })
        .collect()
}

/// Generators whose hosts opted into regeneration on ordinary runs.
pub fn auto_generated<S>(
    generators: &[Arc<dyn ConfigurationGenerator<S>>],
) -> Vec<Arc<dyn ConfigurationGenerator<S>>> {
    generators
        .iter()
        .filter(|g| g.host().auto_generate)
        .cloned()
        .collect()
}
