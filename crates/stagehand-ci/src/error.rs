//! Error types for CI configuration generation and host declarations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Step of a single host's generation run that was in progress when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    PlanReducing,
    EntityBuilding,
    StreamOpening,
    HeaderWriting,
    ContentWriting,
    /// The blocking task running the generation did not complete.
    TaskAborted,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GenerationStage::PlanReducing => "reducing the target plan",
            GenerationStage::EntityBuilding => "building the configuration",
            GenerationStage::StreamOpening => "opening the configuration file",
            GenerationStage::HeaderWriting => "writing the provenance header",
            GenerationStage::ContentWriting => "writing the configuration content",
            GenerationStage::TaskAborted => "running the generation task",
        };
        f.write_str(text)
    }
}

/// Configuration generation failed for one host.
///
/// Failures are isolated per host; callers decide whether they block the build.
#[derive(Debug, Error)]
#[error("configuration generation failed for host '{host_id}' while {stage}: {source}")]
pub struct GenerationError {
    /// Id of the host being generated (`HostName[_Postfix]`).
    pub host_id: String,
    pub stage: GenerationStage,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl GenerationError {
    pub fn new(
        host_id: impl Into<String>,
        stage: GenerationStage,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            host_id: host_id.into(),
            stage,
            source: source.into(),
        }
    }
}

/// Errors produced while loading `[[host]]` declarations.
#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("failed to read host declarations {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse host declarations: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("host id '{0}' is declared more than once")]
    DuplicateHostId(String),

    #[error("hosts '{first}' and '{second}' both write {}", .file.display())]
    SharedConfigurationFile {
        first: String,
        second: String,
        file: PathBuf,
    },
}

/// Result type for generation operations.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;
