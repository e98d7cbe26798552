//! Stagehand CI - pipeline configuration generation
//!
//! Turns the target graph into CI host configuration files:
//! - Reduces the graph to the targets relevant for a host
//! - Writes a provenance header identifying the file as generated
//! - Serializes a host-specific pipeline (GitHub Actions, GitLab, TeamCity)

pub mod declaration;
pub mod error;
pub mod generator;
pub mod header;
pub mod host;
pub mod hosts;
pub mod reduce;
pub mod writer;

// Re-export key types
pub use declaration::{HostDeclaration, HostDeclarations, HostKind};
pub use error::{DeclarationError, GenerationError, GenerationResult, GenerationStage};
pub use generator::{
    auto_generated, generate, generate_all, ConfigurationEntity, ConfigurationGenerator,
    GenerateOptions, GenerationReport, HostOutcome,
};
pub use header::{is_generated, write_provenance_header};
pub use host::{HostConfiguration, ToolIdentity};
pub use reduce::PlanReducer;
pub use writer::{CommentSyntax, ConfigWriter};
