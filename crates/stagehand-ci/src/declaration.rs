//! CI host declarations (`[[host]]` tables of the build definition file).
//!
//! ```toml
//! [[host]]
//! kind = "github-actions"
//! postfix = "staging"
//! relevant_targets = ["Test", "Pack"]
//! irrelevant_targets = ["Restore"]
//! branches = ["main", "release/*"]
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::DeclarationError;
use crate::generator::ConfigurationGenerator;
use crate::host::HostConfiguration;
use crate::hosts::{github, gitlab, teamcity, GitHubActions, GitLab, TeamCity};

/// Supported CI host types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HostKind {
    #[serde(rename = "github-actions")]
    GitHubActions,
    #[serde(rename = "gitlab")]
    GitLab,
    #[serde(rename = "teamcity")]
    TeamCity,
}

impl HostKind {
    /// The host type's name, used as `HostName` in ids.
    pub fn host_name(&self) -> &'static str {
        match self {
            HostKind::GitHubActions => github::HOST_NAME,
            HostKind::GitLab => gitlab::HOST_NAME,
            HostKind::TeamCity => teamcity::HOST_NAME,
        }
    }

    fn default_file(&self, id: &str) -> PathBuf {
        match self {
            HostKind::GitHubActions => {
                PathBuf::from(".github/workflows").join(format!("{}.yml", id.to_lowercase()))
            }
            HostKind::GitLab => PathBuf::from(".gitlab-ci.yml"),
            HostKind::TeamCity => PathBuf::from(".teamcity/settings.kts"),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_build_command() -> String {
    "./build.sh".to_string()
}

/// One `[[host]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct HostDeclaration {
    pub kind: HostKind,
    #[serde(default)]
    pub postfix: Option<String>,
    /// Output path, relative to the build root. Defaults per host kind.
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub relevant_targets: Vec<String>,
    #[serde(default)]
    pub irrelevant_targets: Vec<String>,
    #[serde(default = "default_true")]
    pub auto_generate: bool,
    #[serde(default = "default_build_command")]
    pub build_command: String,
    /// GitHubActions: branches whose pushes trigger the workflow.
    #[serde(default)]
    pub branches: Vec<String>,
    /// GitHubActions: runner label.
    #[serde(default)]
    pub runs_on: Option<String>,
    /// GitLab: default job image.
    #[serde(default)]
    pub image: Option<String>,
}

impl HostDeclaration {
    /// Resolve the declaration into host settings rooted at `root`.
    pub fn configuration(&self, root: &Path) -> HostConfiguration {
        let mut host = HostConfiguration::new(self.kind.host_name(), PathBuf::new())
            .relevant(self.relevant_targets.iter().cloned())
            .irrelevant(self.irrelevant_targets.iter().cloned())
            .auto_generate(self.auto_generate);
        if let Some(postfix) = &self.postfix {
            host = host.with_postfix(postfix.clone());
        }
        let file = self
            .file
            .clone()
            .unwrap_or_else(|| self.kind.default_file(&host.id()));
        host.configuration_file = root.join(file);
        host
    }

    /// Build the generator for this declaration.
    pub fn generator<S>(&self, root: &Path) -> Arc<dyn ConfigurationGenerator<S>> {
        let host = self.configuration(root);
        match self.kind {
            HostKind::GitHubActions => {
                let mut generator = GitHubActions::new(host, self.build_command.clone())
                    .with_branches(self.branches.clone());
                if let Some(runs_on) = &self.runs_on {
                    generator = generator.with_runner(runs_on.clone());
                }
                Arc::new(generator)
            }
            HostKind::GitLab => Arc::new(
                GitLab::new(host, self.build_command.clone()).with_image(self.image.clone()),
            ),
            HostKind::TeamCity => Arc::new(TeamCity::new(host, self.build_command.clone())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDeclarations {
    #[serde(rename = "host")]
    hosts: Vec<HostDeclaration>,
}

/// Every host declared in a build definition file.
#[derive(Debug, Clone)]
pub struct HostDeclarations {
    /// Directory generated paths are relative to.
    pub root: PathBuf,
    pub hosts: Vec<HostDeclaration>,
}

impl HostDeclarations {
    /// Read `[[host]]` tables from `path`; paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, DeclarationError> {
        let content = std::fs::read_to_string(path).map_err(|source| DeclarationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_toml_str(&content, root)
    }

    pub fn from_toml_str(content: &str, root: PathBuf) -> Result<Self, DeclarationError> {
        let raw: RawDeclarations = toml::from_str(content)?;
        let declarations = Self {
            root,
            hosts: raw.hosts,
        };
        declarations.check_unique()?;
        Ok(declarations)
    }

    /// Host ids and output files must be unique so generations never share
    /// a file.
    fn check_unique(&self) -> Result<(), DeclarationError> {
        let mut ids = HashMap::new();
        let mut files: HashMap<PathBuf, String> = HashMap::new();
        for declaration in &self.hosts {
            let host = declaration.configuration(&self.root);
            let id = host.id();
            if ids.insert(id.clone(), ()).is_some() {
                return Err(DeclarationError::DuplicateHostId(id));
            }
            if let Some(first) = files.insert(host.configuration_file.clone(), id.clone()) {
                return Err(DeclarationError::SharedConfigurationFile {
                    first,
                    second: id,
                    file: host.configuration_file,
                });
            }
        }
        Ok(())
    }

    pub fn configurations(&self) -> Vec<HostConfiguration> {
        self.hosts
            .iter()
            .map(|d| d.configuration(&self.root))
            .collect()
    }

    pub fn generators<S>(&self) -> Vec<Arc<dyn ConfigurationGenerator<S>>> {
        self.hosts.iter().map(|d| d.generator(&self.root)).collect()
    }

    /// Find the generator for `host_id`, optionally checking its host name.
    pub fn find<S>(
        &self,
        host_id: &str,
        host_name: Option<&str>,
    ) -> Option<Arc<dyn ConfigurationGenerator<S>>> {
        self.hosts
            .iter()
            .find(|d| {
                let host = d.configuration(&self.root);
                host.id() == host_id && host_name.map_or(true, |name| host.host_name == name)
            })
            .map(|d| d.generator(&self.root))
    }
}
