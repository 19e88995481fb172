use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::types::{RefHead, RefKind};

/// Name of the optional project configuration file.
pub const CONFIG_FILE: &str = ".editlink.toml";

/// Project configuration loaded from `.editlink.toml`.
/// Both sections fall back to the trento docs layout when omitted.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Rules for resolving edit URLs.
    pub edit_url: EditConfig,
    /// Layout of the component tree and the generated navigation file.
    pub navigation: NavConfig,
}

/// Everything the resolver would otherwise hard-code: the organization that
/// owns aggregated components, the path shapes that identify component and
/// contribution pages, and the branch floating refs are pinned to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditConfig {
    /// Path prefix of the synthesized component tree, relative to the site root.
    pub components_root: String,
    /// Path fragment marking pages that describe upstream contribution.
    pub contribution_marker: String,
    /// Hosting provider that edit URLs point at.
    pub host: String,
    /// Branch used for component pages, contribution pages and floating refs.
    pub main_branch: String,
    /// Organization owning every aggregated component repository.
    pub organization: String,
    /// Entry whose presence marks a repository root (directory or file).
    pub repo_marker: String,
    /// Optional directory that may precede `components_root` in scan paths.
    pub site_root: String,
}

/// Raw TOML structure for `.editlink.toml`.
#[derive(Deserialize)]
struct EditlinkToml {
    #[serde(default)]
    edit_url: EditConfig,
    #[serde(default)]
    navigation: NavConfig,
}

/// Settings for the component navigation generator.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavConfig {
    /// Directory holding one subdirectory per aggregated component.
    pub components_dir: PathBuf,
    /// Directories inside each component that hold documentation, in output order.
    pub docs_dirs: Vec<String>,
    /// Nesting depth (number of `*`) of entries directly under a docs directory.
    pub docs_level: usize,
    /// Extension (without the dot) of documentation files.
    pub extension: String,
    /// Name of the generated navigation file.
    pub file_name: String,
    /// Directory names skipped while walking docs directories, compared case-insensitively.
    pub ignored_dirs: Vec<String>,
    /// Directory the navigation file is written to.
    pub output_dir: PathBuf,
    /// README file name that marks a component or a documented subdirectory.
    pub readme: String,
    /// Nesting depth of the per-component README entry.
    pub readme_level: usize,
    /// Nesting depth of the section heading.
    pub section_level: usize,
    /// Label of the section heading.
    pub section_title: String,
    /// Antora module used in generated xrefs.
    pub xref_module: String,
}

impl Config {
    /// Load config from `.editlink.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: EditlinkToml = toml::from_str(content)?;
        return Ok(Self {
            edit_url: raw.edit_url,
            navigation: raw.navigation,
        });
    }
}

impl Default for EditConfig {
    fn default() -> Self {
        return Self {
            components_root: "build/tmp_components".to_string(),
            contribution_marker: "contribution-upstream/".to_string(),
            host: "github.com".to_string(),
            main_branch: "main".to_string(),
            organization: "trento-project".to_string(),
            repo_marker: ".git".to_string(),
            site_root: "trento-docs-site".to_string(),
        };
    }
}

impl EditConfig {
    /// Remote URL of an aggregated component repository.
    pub fn component_remote(&self, repo: &str) -> String {
        return format!("https://{}/{}/{repo}", self.host, self.organization);
    }

    /// The head every remapped target points at.
    pub fn main_ref(&self) -> RefHead {
        return RefHead {
            ref_name: self.main_branch.clone(),
            ref_type: RefKind::Branch,
        };
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        return Self {
            components_dir: PathBuf::from("trento-docs-site/build/tmp_components"),
            docs_dirs: vec!["docs".to_string(), "guides".to_string()],
            docs_level: 4,
            extension: "adoc".to_string(),
            file_name: "nav_components.adoc".to_string(),
            ignored_dirs: vec!["image".to_string(), "images".to_string(), "examples".to_string()],
            output_dir: PathBuf::from("trento-docs-site/build/gen_navigation"),
            readme: "README.adoc".to_string(),
            readme_level: 3,
            section_level: 2,
            section_title: "Components".to_string(),
            xref_module: "ROOT".to_string(),
        };
    }
}

impl NavConfig {
    /// Full path of the navigation file to write.
    pub fn output_path(&self) -> PathBuf {
        return self.output_dir.join(&self.file_name);
    }
}
