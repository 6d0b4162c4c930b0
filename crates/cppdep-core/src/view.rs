//! The granularities a project is analyzed at.
//!
//! Each view adapts one level of the model to [`DependencyItem`]:
//!
//! | View           | Nodes                   | Dependencies outside the view |
//! |----------------|-------------------------|-------------------------------|
//! | all components | every internal component| external packages             |
//! | all packages   | every internal package  | external packages             |
//! | system         | internal groups         | external groups               |
//! | group          | packages of a group     | other groups                  |
//! | package        | components              | other packages                |
//!
//! Everything outside the view collapses into one external node per
//! containing unit, so a package view shows *which* packages a component
//! needs, not which of their headers.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::{self, Write};

use cppdep_graph::report::text::rule;
use cppdep_graph::{DependencyGraph, DependencyItem};
use serde::Serialize;

use crate::model::{ComponentId, Dependency, GroupId, PackageId};
use crate::project::Project;

/// One analyzed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every internal component of the project.
    AllComponents,
    /// Every internal package, named `group.package`.
    AllPackages,
    /// All internal package groups.
    System,
    /// The packages of one group.
    Group(GroupId),
    /// The components of one package.
    Package(PackageId),
}

/// Base name for files written for `view`.
#[must_use]
pub fn graph_name(project: &Project, view: View) -> String {
    match view {
        View::AllComponents => "all_components".to_string(),
        View::AllPackages => "all_packages".to_string(),
        View::System => "system".to_string(),
        View::Group(g) => project.group(g).name.clone(),
        View::Package(p) => {
            let package = project.package(p);
            format!("{}_{}", project.group(package.group).name, package.name)
        }
    }
}

/// Headline printed before the report of `view`.
#[must_use]
pub fn banner(project: &Project, view: View) -> String {
    match view {
        View::AllComponents => "analyzing dependencies among all components ...".to_string(),
        View::AllPackages => "analyzing dependencies among all packages ...".to_string(),
        View::System => "analyzing dependencies among all package groups ...".to_string(),
        View::Group(g) => format!(
            "analyzing dependencies among packages in the specified package group {} ...",
            project.group(g).name
        ),
        View::Package(p) => format!(
            "analyzing dependencies among components in the specified package {} ...",
            project.qualified_name(p)
        ),
    }
}

/// Build the dependency graph of `view`.
///
/// Any dependency that is not a node of the view is external.
#[must_use]
pub fn build_graph(project: &Project, view: View) -> DependencyGraph {
    match view {
        View::AllComponents => {
            let labels = component_labels(project);
            let items: Vec<LabeledComponentItem<'_>> = (0..project.components.len())
                .map(|i| LabeledComponentItem {
                    project,
                    component: ComponentId(i),
                    labels: &labels,
                })
                .collect();
            DependencyGraph::build(items, |_| true)
        }
        View::AllPackages => {
            let items: Vec<QualifiedPackageItem<'_>> = project
                .internal_groups()
                .flat_map(|g| project.group(g).packages.iter().copied())
                .map(|package| QualifiedPackageItem { project, package })
                .collect();
            DependencyGraph::build(items, |_| true)
        }
        View::System => {
            let items: Vec<GroupItem<'_>> = project
                .internal_groups()
                .map(|group| GroupItem { project, group })
                .collect();
            DependencyGraph::build(items, |name| {
                project.groups.iter().any(|g| g.external && g.name == name)
            })
        }
        View::Group(group) => {
            let siblings: HashSet<&str> = project
                .group(group)
                .packages
                .iter()
                .map(|&p| project.package(p).name.as_str())
                .collect();
            let items: Vec<PackageItem<'_>> = project
                .group(group)
                .packages
                .iter()
                .map(|&package| PackageItem {
                    project,
                    package,
                    siblings: &siblings,
                })
                .collect();
            DependencyGraph::build(items, |_| true)
        }
        View::Package(package) => {
            let siblings: HashSet<&str> = project
                .package(package)
                .components
                .iter()
                .map(|&c| project.component(c).name.as_str())
                .collect();
            let items: Vec<ComponentItem<'_>> = project
                .package(package)
                .components
                .iter()
                .map(|&component| ComponentItem {
                    project,
                    component,
                    siblings: &siblings,
                })
                .collect();
            DependencyGraph::build(items, |_| true)
        }
    }
}

/// Node name of every internal component in the all-components view, indexed
/// by component id.
///
/// A name shared by several components, or by an external package, becomes
/// `group.package/component`.
#[must_use]
pub fn component_labels(project: &Project) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for component in &project.components {
        *counts.entry(component.name.as_str()).or_default() += 1;
    }
    let external_packages: HashSet<String> = project
        .packages
        .iter()
        .enumerate()
        .filter(|(_, p)| project.group(p.group).external)
        .map(|(i, _)| project.qualified_name(PackageId(i)))
        .collect();

    project
        .components
        .iter()
        .map(|c| {
            if counts[c.name.as_str()] > 1 || external_packages.contains(&c.name) {
                format!("{}/{}", project.qualified_name(c.package), c.name)
            } else {
                c.name.clone()
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Original graph info
// ---------------------------------------------------------------------------

/// Most component pairs printed per edge in the text report.
pub const MAX_LISTED_PAIRS: usize = 5;

/// The component dependencies that make up one edge of a package or group
/// level graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeDependencies {
    pub from: String,
    pub to: String,
    /// `(component, component)` pairs, in component order.
    pub components: Vec<(String, String)>,
}

/// What lies behind the nodes and edges of a package or group level graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OriginalGraphInfo {
    pub edges: Vec<EdgeDependencies>,
    /// Node → external packages (`group.package`) its components include.
    pub outside_packages: BTreeMap<String, BTreeSet<String>>,
}

impl OriginalGraphInfo {
    /// Write both listings, each under a rule.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        rule(w)?;
        writeln!(
            w,
            "each edge in the original graph logically consists of some cross-component dependencies:"
        )?;
        for edge in &self.edges {
            let pairs: Vec<String> = edge
                .components
                .iter()
                .take(MAX_LISTED_PAIRS)
                .map(|(a, b)| format!("{a}->{b}"))
                .collect();
            let more = if edge.components.len() > MAX_LISTED_PAIRS {
                " ..."
            } else {
                ""
            };
            writeln!(w, "{}->{}: {}{more}", edge.from, edge.to, pairs.join(" "))?;
        }
        rule(w)?;
        writeln!(
            w,
            "each node in the original graph depends on some outside packages:"
        )?;
        for (node, packages) in &self.outside_packages {
            write!(w, "{node}:")?;
            for package in packages {
                write!(w, " {package}")?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

/// Component dependencies behind each edge of `view`, for the views whose
/// nodes aggregate components (all packages, system, group).
#[must_use]
pub fn original_graph_info(project: &Project, view: View) -> Option<OriginalGraphInfo> {
    if !matches!(view, View::AllPackages | View::System | View::Group(_)) {
        return None;
    }

    let node_of = |c: ComponentId| -> Option<String> {
        let package = project.component(c).package;
        match view {
            View::AllPackages => Some(project.qualified_name(package)),
            View::System => Some(project.group(project.package(package).group).name.clone()),
            View::Group(g) if project.package(package).group == g => {
                Some(project.package(package).name.clone())
            }
            _ => None,
        }
    };

    let mut edges: BTreeMap<(String, String), Vec<(String, String)>> = BTreeMap::new();
    let mut outside_packages: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (i, component) in project.components.iter().enumerate() {
        let Some(node) = node_of(ComponentId(i)) else {
            continue;
        };
        let outside = outside_packages.entry(node.clone()).or_default();
        for &dependency in &component.dependencies {
            match dependency {
                Dependency::External(_) => {
                    outside.insert(project.qualified_name(project.dependency_package(dependency)));
                }
                Dependency::Internal(c) => {
                    let Some(target) = node_of(c) else { continue };
                    if target != node {
                        edges
                            .entry((node.clone(), target))
                            .or_default()
                            .push((component.name.clone(), project.component(c).name.clone()));
                    }
                }
            }
        }
    }

    Some(OriginalGraphInfo {
        edges: edges
            .into_iter()
            .map(|((from, to), components)| EdgeDependencies {
                from,
                to,
                components,
            })
            .collect(),
        outside_packages,
    })
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

/// A component in the all-components view.
pub struct LabeledComponentItem<'a> {
    project: &'a Project,
    component: ComponentId,
    labels: &'a [String],
}

impl DependencyItem for LabeledComponentItem<'_> {
    fn name(&self) -> String {
        self.labels[self.component.0].clone()
    }

    fn dependencies(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .project
            .component(self.component)
            .dependencies
            .iter()
            .map(|&d| match d {
                Dependency::Internal(c) => self.labels[c.0].clone(),
                Dependency::External(_) => {
                    self.project.qualified_name(self.project.dependency_package(d))
                }
            })
            .collect();
        names.into_iter().collect()
    }
}

/// A package in the all-packages view.
pub struct QualifiedPackageItem<'a> {
    project: &'a Project,
    package: PackageId,
}

impl DependencyItem for QualifiedPackageItem<'_> {
    fn name(&self) -> String {
        self.project.qualified_name(self.package)
    }

    fn dependencies(&self) -> Vec<String> {
        self.project
            .package_dependencies(self.package)
            .into_iter()
            .map(|p| self.project.qualified_name(p))
            .collect()
    }
}

/// A package group in the system view.
pub struct GroupItem<'a> {
    project: &'a Project,
    group: GroupId,
}

impl DependencyItem for GroupItem<'_> {
    fn name(&self) -> String {
        self.project.group(self.group).name.clone()
    }

    fn dependencies(&self) -> Vec<String> {
        self.project
            .group_dependencies(self.group)
            .into_iter()
            .map(|g| self.project.group(g).name.clone())
            .collect()
    }
}

/// A package in its group's view.
pub struct PackageItem<'a> {
    project: &'a Project,
    package: PackageId,
    siblings: &'a HashSet<&'a str>,
}

impl DependencyItem for PackageItem<'_> {
    fn name(&self) -> String {
        self.project.package(self.package).name.clone()
    }

    fn dependencies(&self) -> Vec<String> {
        let own_group = self.project.package(self.package).group;
        let names: BTreeSet<String> = self
            .project
            .package_dependencies(self.package)
            .into_iter()
            .map(|p| {
                let dep = self.project.package(p);
                if dep.group == own_group {
                    dep.name.clone()
                } else {
                    group_label(&self.project.group(dep.group).name, self.siblings)
                }
            })
            .collect();
        names.into_iter().collect()
    }
}

/// A component in its package's view.
pub struct ComponentItem<'a> {
    project: &'a Project,
    component: ComponentId,
    siblings: &'a HashSet<&'a str>,
}

impl DependencyItem for ComponentItem<'_> {
    fn name(&self) -> String {
        self.project.component(self.component).name.clone()
    }

    fn dependencies(&self) -> Vec<String> {
        let own_package = self.project.component(self.component).package;
        let names: BTreeSet<String> = self
            .project
            .component(self.component)
            .dependencies
            .iter()
            .map(|&d| match d {
                Dependency::Internal(c) if self.project.component(c).package == own_package => {
                    self.project.component(c).name.clone()
                }
                _ => {
                    let p = self.project.dependency_package(d);
                    let name = &self.project.package(p).name;
                    if self.siblings.contains(name.as_str()) {
                        self.project.qualified_name(p)
                    } else {
                        name.clone()
                    }
                }
            })
            .collect();
        names.into_iter().collect()
    }
}

/// Node name of a foreign group; a trailing `/` marks it when a sibling
/// package has the same name.
fn group_label(name: &str, siblings: &HashSet<&str>) -> String {
    if siblings.contains(name) {
        format!("{name}/")
    } else {
        name.to_string()
    }
}
