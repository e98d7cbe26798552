//! CI host identity and per-host generation settings.

use std::path::PathBuf;

/// Settings for one declared CI host.
///
/// Constructed once at build startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfiguration {
    /// The host type's name, e.g. `GitHubActions`.
    pub host_name: String,
    /// Optional sub-identifier distinguishing several declarations of one host.
    pub id_postfix: Option<String>,
    /// File created or overwritten by generation.
    pub configuration_file: PathBuf,
    /// Entry targets whose dependency closures make up the pipeline.
    pub relevant_targets: Vec<String>,
    /// Targets excluded from the pipeline even when reachable.
    pub irrelevant_targets: Vec<String>,
    /// Whether ordinary build runs regenerate this file.
    pub auto_generate: bool,
}

impl HostConfiguration {
    pub fn new(host_name: impl Into<String>, configuration_file: impl Into<PathBuf>) -> Self {
        Self {
            host_name: host_name.into(),
            id_postfix: None,
            configuration_file: configuration_file.into(),
            relevant_targets: Vec::new(),
            irrelevant_targets: Vec::new(),
            auto_generate: true,
        }
    }

    pub fn with_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.id_postfix = Some(postfix.into());
        self
    }

    pub fn relevant<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.relevant_targets = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn irrelevant<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.irrelevant_targets = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn auto_generate(mut self, enabled: bool) -> Self {
        self.auto_generate = enabled;
        self
    }

    fn postfix(&self) -> Option<&str> {
        self.id_postfix.as_deref().filter(|p| !p.is_empty())
    }

    /// `HostName`, suffixed with `_<IdPostfix>` when a postfix is declared.
    pub fn id(&self) -> String {
        match self.postfix() {
            Some(postfix) => format!("{}_{}", self.host_name, postfix),
            None => self.host_name.clone(),
        }
    }

    /// `HostName`, suffixed with ` (<IdPostfix>)` when a postfix is declared.
    pub fn display_name(&self) -> String {
        match self.postfix() {
            Some(postfix) => format!("{} ({})", self.host_name, postfix),
            None => self.host_name.clone(),
        }
    }
}

/// Identity of the tool named in generated files' regeneration instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolIdentity {
    /// Command users invoke, e.g. `stagehand`.
    pub command: String,
    /// Long flag (without dashes) selecting a host id to regenerate.
    pub configuration_parameter: String,
}

impl ToolIdentity {
    pub fn new(command: impl Into<String>, configuration_parameter: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            configuration_parameter: configuration_parameter.into(),
        }
    }

    /// `<tool> --<configuration-parameter> <host-id> --host <host-name>`
    pub fn regeneration_command(&self, host: &HostConfiguration) -> String {
        format!(
            "{} --{} {} --host {}",
            self.command,
            self.configuration_parameter,
            host.id(),
            host.host_name
        )
    }
}

impl Default for ToolIdentity {
    fn default() -> Self {
        Self::new("stagehand", "generate-configuration")
    }
}
