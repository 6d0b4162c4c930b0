//! Package groups, packages, and components.
//!
//! The model is an arena: [`crate::project::Project`] owns flat vectors of
//! groups, packages, components, and external components, and everything
//! refers to everything else by typed index.
//!
//! ```text
//! PackageGroup ──< Package ──< Component ──> Dependency (internal | external)
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::config::{GroupConfig, PackageConfig};
use crate::error::{Error, Result};
use crate::include::Include;
use crate::path::{common_dir, has_glob_meta, is_ancestor, join_normalized, literal_base};

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Index of a [`PackageGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

/// Index of a [`Package`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub usize);

/// Index of a [`Component`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

/// Index of an [`ExternalComponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalId(pub usize);

/// A component dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dependency {
    Internal(ComponentId),
    External(ExternalId),
}

// ---------------------------------------------------------------------------
// PackageGroup
// ---------------------------------------------------------------------------

/// A named collection of packages under one directory.
#[derive(Debug, Clone)]
pub struct PackageGroup {
    pub name: String,
    /// Absolute, normalized group directory.
    pub path: PathBuf,
    pub packages: Vec<PackageId>,
    /// `true` for groups from the `external` section.
    pub external: bool,
}

impl PackageGroup {
    /// Create an empty group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `path` is not a directory.
    pub fn new(config: &GroupConfig, path: PathBuf, external: bool) -> Result<Self> {
        if !path.is_dir() {
            return Err(Error::invalid(format!("{} is not a directory", path.display())));
        }
        Ok(Self {
            name: config.name.clone(),
            path,
            packages: Vec::new(),
            external,
        })
    }
}

// ---------------------------------------------------------------------------
// Package
// ---------------------------------------------------------------------------

/// One `src` entry: a literal path or a glob under a literal base directory.
#[derive(Debug, Clone)]
pub struct SourcePattern {
    /// Absolute, normalized path or pattern.
    pub path: PathBuf,
    /// Deepest directory free of glob metacharacters.
    pub base: PathBuf,
    /// `None` for literal paths.
    pub matcher: Option<GlobMatcher>,
}

impl SourcePattern {
    /// Return `true` if `file` is selected by this entry.
    #[must_use]
    pub fn selects(&self, file: &Path) -> bool {
        self.matcher.as_ref().map_or_else(
            || is_ancestor(&self.path, file),
            |m| {
                file.ancestors()
                    .take_while(|a| is_ancestor(&self.base, a))
                    .any(|a| m.is_match(a))
            },
        )
    }
}

/// A collection of components.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub group: GroupId,
    pub sources: Vec<SourcePattern>,
    /// Excluded files and directories.
    pub ignore: GlobSet,
    /// Exported header directories.
    pub include_paths: Vec<PathBuf>,
    /// Directories whose headers belong to this package (includes
    /// `include_paths`).
    pub alias_paths: Vec<PathBuf>,
    /// Include-directive patterns, anchored at the start.
    pub patterns: Vec<Regex>,
    /// Common directory of the source paths; component names are relative
    /// to it.
    pub root: PathBuf,
    pub components: Vec<ComponentId>,
}

impl Package {
    /// Create an empty package of the group at `group_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for paths outside the group, include
    /// or alias paths that are not directories, and duplicated paths;
    /// [`Error::InvalidPattern`] for globs and regexes that do not compile.
    pub fn new(
        config: &PackageConfig,
        group: GroupId,
        group_name: &str,
        group_path: &Path,
    ) -> Result<Self> {
        let scope = PathScope {
            group_name,
            group_path,
            package: &config.name,
        };
        let src = scope.resolve(config.src.iter().map(Path::new), false)?;
        let ignore = scope.resolve(config.ignore.iter().map(Path::new), false)?;
        let include_paths = scope.resolve(config.include.iter().map(PathBuf::as_path), true)?;
        let mut alias_paths = scope.resolve(config.alias.iter().map(PathBuf::as_path), true)?;
        for path in &include_paths {
            if !alias_paths.contains(path) {
                alias_paths.push(path.clone());
            }
        }

        let sources = src.into_iter().map(source_pattern).collect::<Result<Vec<_>>>()?;
        let root = common_dir(&sources.iter().map(|s| s.base.clone()).collect::<Vec<_>>())
            .unwrap_or_else(|| group_path.to_path_buf());

        Ok(Self {
            name: config.name.clone(),
            group,
            sources,
            ignore: glob_set(&ignore)?,
            include_paths,
            alias_paths,
            patterns: config
                .pattern
                .iter()
                .map(|p| anchored_regex(p))
                .collect::<Result<_>>()?,
            root,
            components: Vec::new(),
        })
    }

    /// Return `true` if `path` or one of its ancestors is ignored.
    #[must_use]
    pub fn is_ignored(&self, path: &Path) -> bool {
        !self.ignore.is_empty() && path.ancestors().any(|a| self.ignore.is_match(a))
    }
}

/// Where a package's configured paths are resolved.
struct PathScope<'a> {
    group_name: &'a str,
    group_path: &'a Path,
    package: &'a str,
}

impl PathScope<'_> {
    /// Make `paths` absolute under the group directory.
    fn resolve<'p>(
        &self,
        paths: impl Iterator<Item = &'p Path>,
        check_dir: bool,
    ) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for path in paths {
            let abs = join_normalized(self.group_path, path);
            if !is_ancestor(self.group_path, &abs) || (check_dir && !abs.is_dir()) {
                return Err(Error::invalid(format!(
                    "{} is not a directory in {} (group {})",
                    path.display(),
                    self.group_path.display(),
                    self.group_name
                )));
            }
            if !seen.insert(abs.clone()) {
                return Err(Error::invalid(format!(
                    "{} is duplicated in {}.{}",
                    abs.display(),
                    self.group_name,
                    self.package
                )));
            }
            out.push(abs);
        }
        Ok(out)
    }
}

fn source_pattern(path: PathBuf) -> Result<SourcePattern> {
    let text = path.to_string_lossy();
    if !has_glob_meta(&text) {
        return Ok(SourcePattern {
            base: path.clone(),
            path,
            matcher: None,
        });
    }
    let matcher = Glob::new(&text)
        .map_err(|e| Error::InvalidPattern {
            pattern: text.to_string(),
            reason: e.to_string(),
        })?
        .compile_matcher();
    Ok(SourcePattern {
        base: literal_base(&path),
        path,
        matcher: Some(matcher),
    })
}

fn glob_set(paths: &[PathBuf]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for path in paths {
        let text = path.to_string_lossy();
        let glob = Glob::new(&text).map_err(|e| Error::InvalidPattern {
            pattern: text.to_string(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::InvalidPattern {
        pattern: String::new(),
        reason: e.to_string(),
    })
}

/// Compile `pattern` so that it only matches at the start of the input.
///
/// # Errors
///
/// Returns [`Error::InvalidPattern`] if the regex does not compile.
pub fn anchored_regex(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// A header/implementation pair (or either half alone) in a package.
#[derive(Debug, Clone)]
pub struct Component {
    /// Path relative to the package root, without extension, `/`-separated.
    pub name: String,
    pub hpath: Option<PathBuf>,
    pub cpath: Option<PathBuf>,
    pub package: PackageId,
    /// Directory of the identifying file; quoted includes start here.
    pub working_dir: PathBuf,
    pub includes_in_h: Vec<Include>,
    pub includes_in_c: Vec<Include>,
    pub dependencies: Vec<Dependency>,
}

impl Component {
    /// Path that identifies the component: the header, else the
    /// implementation file.
    #[must_use]
    pub fn id_path(&self) -> &Path {
        self.hpath
            .as_deref()
            .or(self.cpath.as_deref())
            .unwrap_or(self.working_dir.as_path())
    }

    /// Return `true` if the implementation file is an `.ipp` template body.
    #[must_use]
    pub fn has_ipp(&self) -> bool {
        self.cpath
            .as_ref()
            .and_then(|p| p.extension())
            .is_some_and(|e| e.eq_ignore_ascii_case("ipp"))
    }
}

/// A header outside the analyzed groups, known only by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalComponent {
    pub hpath: PathBuf,
    pub package: PackageId,
}
