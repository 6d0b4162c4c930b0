//! A configured project: every group, package, and component, with resolved
//! dependencies.
//!
//! # Pipeline
//!
//! ```text
//! .cppdep.yml
//!        ↓  Config::load()
//! Config
//!        ↓  Project::from_config()
//! groups + packages        (paths checked, patterns compiled)
//!        ↓  component::construct_components()
//! components               (files paired, includes scanned)
//!        ↓  Project::resolve_includes()
//! component dependencies   (internal or external components)
//!        ↓  Project::analyze()
//! component / package / group views → cppdep_graph::Analysis → reports
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use cppdep_core::{Project, ReportOptions};
//!
//! let project = Project::load(Path::new(".cppdep.yml"))?;
//! project.analyze(&mut std::io::stdout(), &ReportOptions::default())?;
//! ```

use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use cppdep_graph::report::dot::write_graphs;
use cppdep_graph::report::json::AnalysisReport;
use cppdep_graph::report::text::{write_report, DependencyListing};
use cppdep_graph::Analysis;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::component::construct_components;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::include::Location;
use crate::model::{
    Component, ComponentId, Dependency, ExternalComponent, ExternalId, GroupId, Package,
    PackageGroup, PackageId,
};
use crate::path::is_ancestor;
use crate::view::{self, OriginalGraphInfo, View};

/// Width of the banner line printed before each view.
pub const BANNER_WIDTH: usize = 80;

/// What to produce for each analyzed view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Dependency listing under each node of the level report.
    pub listing: DependencyListing,
    /// Write `<view>_orig/_cycles/_final.dot` into this directory.
    pub graph_dir: Option<PathBuf>,
    /// Emit one JSON document with all views instead of the text report.
    pub json: bool,
}

/// One entry of the JSON report.
#[derive(Debug, Serialize)]
struct ViewReport {
    #[serde(flatten)]
    analysis: AnalysisReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_graph: Option<OriginalGraphInfo>,
}

/// The loaded project.
#[derive(Debug, Clone)]
pub struct Project {
    pub groups: Vec<PackageGroup>,
    pub packages: Vec<Package>,
    pub components: Vec<Component>,
    pub externals: Vec<ExternalComponent>,
    /// Include directories of all packages, internal ones first.
    include_dirs: Vec<PathBuf>,
    /// Alias directories of external packages, sorted by path.
    aliases: Vec<(PathBuf, PackageId)>,
    /// Include patterns of external packages.
    patterns: Vec<(PackageId, Vec<Regex>)>,
    /// Identifying file → internal component.
    internal_index: HashMap<PathBuf, ComponentId>,
    /// Header path → external component.
    external_index: HashMap<PathBuf, ExternalId>,
}

impl Project {
    /// Load the configuration at `path` and build the project.
    ///
    /// # Errors
    ///
    /// Any configuration, I/O, or association error; see [`Error`].
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_config(&Config::load(path)?)
    }

    /// Build groups and packages, construct components, and resolve includes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] or [`Error::InvalidPattern`] for an
    /// impossible configuration, [`Error::Io`] for unreadable sources, and
    /// [`Error::Unassociated`] for a header that belongs to no package.
    #[instrument(skip_all)]
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut project = Self {
            groups: Vec::new(),
            packages: Vec::new(),
            components: Vec::new(),
            externals: Vec::new(),
            include_dirs: Vec::new(),
            aliases: Vec::new(),
            patterns: Vec::new(),
            internal_index: HashMap::new(),
            external_index: HashMap::new(),
        };

        let sections = config
            .internal
            .iter()
            .map(|g| (g, false))
            .chain(config.external.iter().map(|g| (g, true)));
        for (group_config, external) in sections {
            let group_id = GroupId(project.groups.len());
            let mut group = PackageGroup::new(group_config, config.group_dir(group_config), external)?;
            for package_config in &group_config.packages {
                let package = Package::new(package_config, group_id, &group.name, &group.path)?;
                group.packages.push(PackageId(project.packages.len()));
                project.packages.push(package);
            }
            project.groups.push(group);
        }

        project.gather_search_paths()?;
        project.make_components()?;
        project.resolve_includes()?;
        debug!(
            groups = project.groups.len(),
            packages = project.packages.len(),
            components = project.components.len(),
            externals = project.externals.len(),
            "project loaded"
        );
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn group(&self, id: GroupId) -> &PackageGroup {
        &self.groups[id.0]
    }

    #[must_use]
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    #[must_use]
    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }

    /// Ids of the internal groups, in configuration order.
    pub fn internal_groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.external)
            .map(|(i, _)| GroupId(i))
    }

    /// `group.package` for messages.
    #[must_use]
    pub fn qualified_name(&self, id: PackageId) -> String {
        let package = self.package(id);
        format!("{}.{}", self.group(package.group).name, package.name)
    }

    /// Package a dependency belongs to.
    #[must_use]
    pub fn dependency_package(&self, dependency: Dependency) -> PackageId {
        match dependency {
            Dependency::Internal(c) => self.component(c).package,
            Dependency::External(e) => self.externals[e.0].package,
        }
    }

    /// Packages the components of `id` depend on, other than `id` itself.
    #[must_use]
    pub fn package_dependencies(&self, id: PackageId) -> BTreeSet<PackageId> {
        self.package(id)
            .components
            .iter()
            .flat_map(|&c| self.component(c).dependencies.iter())
            .map(|&d| self.dependency_package(d))
            .filter(|&p| p != id)
            .collect()
    }

    /// Groups the packages of `id` depend on, other than `id` itself.
    #[must_use]
    pub fn group_dependencies(&self, id: GroupId) -> BTreeSet<GroupId> {
        self.group(id)
            .packages
            .iter()
            .flat_map(|&p| self.package_dependencies(p))
            .map(|p| self.package(p).group)
            .filter(|&g| g != id)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    fn gather_search_paths(&mut self) -> Result<()> {
        let (internal, external): (Vec<&Package>, Vec<&Package>) = self
            .packages
            .iter()
            .partition(|p| !self.groups[p.group.0].external);
        self.include_dirs = internal
            .iter()
            .chain(&external)
            .flat_map(|p| p.include_paths.iter().cloned())
            .collect();

        for (i, package) in self.packages.iter().enumerate() {
            if !self.groups[package.group.0].external {
                continue;
            }
            let id = PackageId(i);
            self.aliases
                .extend(package.alias_paths.iter().map(|a| (a.clone(), id)));
            if !package.patterns.is_empty() {
                self.patterns.push((id, package.patterns.clone()));
            }
        }
        self.aliases.sort();
        for pair in self.aliases.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Error::invalid(format!(
                    "ambiguous alias {} for packages {} and {}",
                    pair[0].0.display(),
                    self.qualified_name(pair[0].1),
                    self.qualified_name(pair[1].1)
                )));
            }
        }
        Ok(())
    }

    fn make_components(&mut self) -> Result<()> {
        for i in 0..self.packages.len() {
            let id = PackageId(i);
            if self.groups[self.packages[i].group.0].external {
                continue;
            }
            let qualified = self.qualified_name(id);
            for component in construct_components(&self.packages[i], id, &qualified)? {
                let cid = ComponentId(self.components.len());
                self.internal_index.insert(component.id_path().to_path_buf(), cid);
                if component.has_ipp() {
                    if let Some(cpath) = &component.cpath {
                        self.internal_index.insert(cpath.clone(), cid);
                    }
                }
                self.packages[i].components.push(cid);
                self.components.push(component);
            }
        }
        Ok(())
    }

    fn resolve_includes(&mut self) -> Result<()> {
        for i in 0..self.components.len() {
            let component = &self.components[i];
            let includes: Vec<_> = component
                .includes_in_h
                .iter()
                .chain(&component.includes_in_c)
                .map(|inc| {
                    let location =
                        inc.locate(&component.working_dir, &self.include_dirs, &self.patterns);
                    (inc.to_string(), inc.hfile.clone(), location)
                })
                .collect();

            let mut dependencies = BTreeSet::new();
            for (written, hfile, location) in includes {
                let dependency = match location {
                    Location::NotFound => {
                        warn!(
                            component = %self.components[i].name,
                            include = %written,
                            "include issues: header not found"
                        );
                        continue;
                    }
                    Location::Pattern(package) => self.external(hfile, Some(package))?,
                    Location::File(hpath) => match self.internal_index.get(&hpath) {
                        Some(&cid) if cid.0 == i => continue,
                        Some(&cid) => Dependency::Internal(cid),
                        None => self.external(hpath, None)?,
                    },
                };
                dependencies.insert(dependency);
            }
            self.components[i].dependencies = dependencies.into_iter().collect();
        }
        Ok(())
    }

    /// The external component for `hpath`, created on first use.
    fn external(&mut self, hpath: PathBuf, package: Option<PackageId>) -> Result<Dependency> {
        if let Some(&id) = self.external_index.get(&hpath) {
            return Ok(Dependency::External(id));
        }
        let package = match package {
            Some(p) => p,
            None => self.alias_package(&hpath)?,
        };
        let id = ExternalId(self.externals.len());
        self.external_index.insert(hpath.clone(), id);
        self.externals.push(ExternalComponent { hpath, package });
        Ok(Dependency::External(id))
    }

    /// External package with the deepest alias directory above `hpath`.
    fn alias_package(&self, hpath: &Path) -> Result<PackageId> {
        self.aliases
            .iter()
            .rev()
            .find(|(alias, _)| is_ancestor(alias, hpath))
            .map(|&(_, package)| package)
            .ok_or_else(|| Error::Unassociated {
                path: hpath.to_path_buf(),
            })
    }

    // -----------------------------------------------------------------------
    // Analysis
    // -----------------------------------------------------------------------

    /// Views worth analyzing, in report order.
    ///
    /// - the all-components view, if there are components,
    /// - the all-packages view, if there is more than one internal package,
    /// - the system view, if there is more than one internal group,
    /// - a group view for each internal group with more than one package,
    /// - a package view for each internal package with components.
    #[must_use]
    pub fn views(&self) -> Vec<View> {
        let groups: Vec<GroupId> = self.internal_groups().collect();
        let mut views = Vec::new();
        if !self.components.is_empty() {
            views.push(View::AllComponents);
        }
        let packages: usize = groups.iter().map(|&g| self.group(g).packages.len()).sum();
        if packages > 1 {
            views.push(View::AllPackages);
        }
        if groups.len() > 1 {
            views.push(View::System);
        }
        views.extend(
            groups
                .iter()
                .filter(|&&g| self.group(g).packages.len() > 1)
                .map(|&g| View::Group(g)),
        );
        for &g in &groups {
            views.extend(
                self.group(g)
                    .packages
                    .iter()
                    .filter(|&&p| !self.package(p).components.is_empty())
                    .map(|&p| View::Package(p)),
            );
        }
        views
    }

    /// Analyze every view and write the reports to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] if writing fails and [`Error::Graph`] if the
    /// engine rejects a graph.
    #[instrument(skip_all, fields(json = options.json))]
    pub fn analyze(&self, out: &mut dyn Write, options: &ReportOptions) -> Result<()> {
        let mut reports = Vec::new();
        for view in self.views() {
            let name = view::graph_name(self, view);
            let analysis = Analysis::run(view::build_graph(self, view))?;
            info!(
                view = %name,
                components = analysis.summary.components,
                cycles = analysis.summary.cycles,
                ccd = analysis.summary.ccd,
                "view analyzed"
            );

            let original_graph = view::original_graph_info(self, view);
            if options.json {
                reports.push(ViewReport {
                    analysis: AnalysisReport::new(&name, &analysis, options.listing),
                    original_graph,
                });
            } else {
                writeln!(out)?;
                writeln!(out, "{}", "#".repeat(BANNER_WIDTH))?;
                writeln!(out, "{}", view::banner(self, view))?;
                if let Some(info) = &original_graph {
                    info.write_text(out)?;
                }
                write_report(&analysis, options.listing, out)?;
            }

            if let Some(dir) = &options.graph_dir {
                write_graphs(&analysis, dir, &name)?;
            }
        }

        if options.json {
            serde_json::to_writer_pretty(&mut *out, &reports).map_err(std::io::Error::from)?;
            writeln!(out)?;
        }
        Ok(())
    }
}
