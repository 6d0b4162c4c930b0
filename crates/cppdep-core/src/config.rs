//! YAML project description.
//!
//! ```yaml
//! internal:
//!   - name: app
//!     path: .
//!     packages:
//!       - name: core
//!         src: [src/core]
//!         include: [include]
//! external:
//!   - name: third_party
//!     path: /usr/include
//!     packages:
//!       - name: boost
//!         include: [boost]
//!       - name: std
//!         pattern: ['^[a-z_]+$']
//! ```
//!
//! Group paths are resolved against the directory of the configuration file.
//! All package paths are relative to their group path.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = ".cppdep.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Package groups under analysis.
    pub internal: Vec<GroupConfig>,
    /// Package groups the project depends on.
    #[serde(default)]
    pub external: Vec<GroupConfig>,
    /// Directory the group paths are relative to.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub name: String,
    pub path: PathBuf,
    pub packages: Vec<PackageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    pub name: String,
    /// Source files or directories (glob patterns).
    #[serde(default)]
    pub src: Vec<String>,
    /// Exported header directories; they double as aliases.
    #[serde(default)]
    pub include: Vec<PathBuf>,
    /// Additional directories whose headers belong to this package.
    #[serde(default)]
    pub alias: Vec<PathBuf>,
    /// Regexes matched against include directives (external packages).
    #[serde(default)]
    pub pattern: Vec<String>,
    /// Excluded files or directories (glob patterns).
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Config {
    /// Read, parse, and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::Yaml`] if it
    /// is malformed or has unknown keys, and [`Error::InvalidArgument`] if it
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let base_dir = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
        let config = Self::parse(&content, path, base_dir)?;
        debug!(
            path = %path.display(),
            internal = config.internal.len(),
            external = config.external.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate YAML text. `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], minus I/O.
    pub fn parse(content: &str, origin: &Path, base_dir: PathBuf) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(content).map_err(|source| Error::Yaml {
            path: origin.to_path_buf(),
            source,
        })?;
        config.base_dir = base_dir;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks the schema cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.internal.is_empty() {
            return Err(Error::invalid("no internal package groups are configured"));
        }
        let mut groups = HashSet::new();
        for group in self.internal.iter().chain(&self.external) {
            if !groups.insert(group.name.as_str()) {
                return Err(Error::invalid(format!(
                    "redefinition of {} group",
                    group.name
                )));
            }
            if group.packages.is_empty() {
                return Err(Error::invalid(format!("{} group has no packages", group.name)));
            }
            let mut packages = HashSet::new();
            for package in &group.packages {
                if !packages.insert(package.name.as_str()) {
                    return Err(Error::invalid(format!(
                        "{} is a duplicate package in {} group",
                        package.name, group.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Absolute, normalized path of `group`.
    #[must_use]
    pub fn group_dir(&self, group: &GroupConfig) -> PathBuf {
        let joined = self.base_dir.join(&group.path);
        let absolute = std::path::absolute(&joined).unwrap_or(joined);
        crate::path::normalize(&absolute)
    }
}
