//! Turning a package's source files into components.
//!
//! Lakos defines a component as a header plus its implementation file, but
//! template-only or macro-only headers are components too. So:
//!
//! - a header and an implementation file with the same stem are paired,
//! - an unpaired header is a header-only component,
//! - an unpaired implementation file is an incomplete component (warning).
//!
//! Headers and implementation files often live in different directories
//! (`include/x/a.h`, `src/a.cpp`), so pairing prefers the candidate sharing
//! the longest run of path segments counted from the file name upwards.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::include::Include;
use crate::model::{Component, Package, PackageId};
use crate::path::{strip_extension, to_posix};

static SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\w\-]+(?:(?P<h>\.h(?:h|xx|\+\+|pp)?)|(?P<c>\.(?:c(?:c|xx|\+\+|pp)?|ipp)))?$",
    )
    .expect("source regex is valid")
});

/// What a file name says about a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Header,
    Implementation,
}

/// Classify a file name; `None` for anything that is not C/C++ source.
///
/// Extension-less names count as headers (`<vector>`, `<QString>`).
#[must_use]
pub fn classify(file_name: &str) -> Option<SourceKind> {
    let captures = SOURCE_RE.captures(file_name)?;
    if captures.name("c").is_some() {
        Some(SourceKind::Implementation)
    } else {
        Some(SourceKind::Header)
    }
}

// ---------------------------------------------------------------------------
// Gathering
// ---------------------------------------------------------------------------

/// Every selected, non-ignored source file of `package`, sorted.
#[must_use]
pub fn gather_files(package: &Package) -> Vec<PathBuf> {
    let mut files = BTreeSet::new();
    for source in &package.sources {
        let walker = WalkDir::new(&source.base)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !package.is_ignored(e.path()));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable path");
                    continue;
                }
            };
            if entry.file_type().is_file() && source.selects(entry.path()) {
                files.insert(entry.into_path());
            }
        }
    }
    files.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SourceFile {
    /// Path segments without extension, file name first.
    reversed: Vec<String>,
    path: PathBuf,
}

impl SourceFile {
    fn new(path: PathBuf) -> Self {
        let mut reversed: Vec<String> = strip_extension(&path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        reversed.reverse();
        Self { reversed, path }
    }

    fn shared_segments(&self, other: &Self) -> usize {
        self.reversed
            .iter()
            .zip(&other.reversed)
            .take_while(|(a, b)| a == b)
            .count()
    }
}

/// A paired header and implementation file; at least one is present.
pub type FilePair = (Option<PathBuf>, Option<PathBuf>);

/// Pair headers with implementation files.
#[must_use]
pub fn pair_files(files: &[PathBuf]) -> Vec<FilePair> {
    let mut headers: BTreeMap<String, Vec<SourceFile>> = BTreeMap::new();
    let mut impls: BTreeMap<String, Vec<SourceFile>> = BTreeMap::new();
    for path in files {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let Some(kind) = classify(&name) else {
            continue;
        };
        let stem = strip_extension(Path::new(&name)).to_string_lossy().into_owned();
        let bucket = match kind {
            SourceKind::Header => &mut headers,
            SourceKind::Implementation => &mut impls,
        };
        bucket.entry(stem).or_default().push(SourceFile::new(path.clone()));
    }

    let mut pairs = Vec::new();
    for (stem, hfiles) in headers {
        match impls.remove(&stem) {
            Some(cfiles) => pairs.extend(pair_stem(hfiles, cfiles)),
            None => pairs.extend(hfiles.into_iter().map(|h| (Some(h.path), None))),
        }
    }
    for cfiles in impls.into_values() {
        pairs.extend(cfiles.into_iter().map(|c| (None, Some(c.path))));
    }
    pairs
}

/// Pair files sharing one stem. Implementation files with the strongest
/// candidate lists choose first.
fn pair_stem(hfiles: Vec<SourceFile>, cfiles: Vec<SourceFile>) -> Vec<FilePair> {
    let mut candidates: Vec<(SourceFile, Vec<(usize, usize)>)> = cfiles
        .into_iter()
        .map(|c| {
            let mut scores: Vec<(usize, usize)> = hfiles
                .iter()
                .enumerate()
                .map(|(i, h)| (c.shared_segments(h), i))
                .collect();
            // Best score first; ties go to the earlier path.
            scores.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            (c, scores)
        })
        .collect();
    candidates.sort_by(|a, b| {
        let key = |s: &[(usize, usize)]| s.iter().map(|x| x.0).collect::<Vec<_>>();
        key(b.1.as_slice()).cmp(&key(a.1.as_slice())).then_with(|| a.0.cmp(&b.0))
    });

    let mut taken = vec![false; hfiles.len()];
    let mut pairs = Vec::new();
    for (cfile, scores) in candidates {
        let choice = scores.iter().map(|&(_, i)| i).find(|&i| !taken[i]);
        if let Some(i) = choice {
            taken[i] = true;
            pairs.push((Some(hfiles[i].path.clone()), Some(cfile.path)));
        } else {
            pairs.push((None, Some(cfile.path)));
        }
    }
    for (i, hfile) in hfiles.into_iter().enumerate() {
        if !taken[i] {
            pairs.push((Some(hfile.path), None));
        }
    }
    pairs
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Build the components of `package` from its source files.
///
/// Names that collide within the package keep their extension so that every
/// component stays a distinct graph node.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if a source file cannot be read.
#[instrument(skip_all, fields(package = %package.name))]
pub fn construct_components(
    package: &Package,
    package_id: PackageId,
    qualified_name: &str,
) -> Result<Vec<Component>> {
    let files = gather_files(package);
    let pairs = pair_files(&files);

    let mut components = Vec::with_capacity(pairs.len());
    for (hpath, cpath) in pairs {
        let Some(naming) = cpath.as_ref().or(hpath.as_ref()) else {
            continue;
        };
        let relative = naming.strip_prefix(&package.root).unwrap_or(naming);
        let name = to_posix(&strip_extension(relative));
        if hpath.is_none() {
            warn!(
                component = %name,
                package = %qualified_name,
                "incomplete component: missing header"
            );
        }
        let working_dir = naming
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        let includes_in_h = hpath.as_deref().map(Include::grep).transpose()?.unwrap_or_default();
        let includes_in_c = cpath.as_deref().map(Include::grep).transpose()?.unwrap_or_default();
        let mut component = Component {
            name,
            hpath,
            cpath,
            package: package_id,
            working_dir,
            includes_in_h,
            includes_in_c,
            dependencies: Vec::new(),
        };
        sanitize_includes(&mut component);
        components.push(component);
    }

    disambiguate_names(&mut components, &package.root);
    debug!(files = files.len(), components = components.len(), "components constructed");
    Ok(components)
}

/// Check include hygiene and drop duplicate and redundant includes.
pub fn sanitize_includes(component: &mut Component) {
    if let (Some(hpath), Some(cpath)) = (&component.hpath, &component.cpath) {
        let hfile = hpath.file_name();
        let first = component.includes_in_c.first().and_then(Include::file_name);
        if !component.includes_in_c.iter().any(|i| i.file_name() == hfile) {
            warn!(
                file = %cpath.display(),
                header = %hpath.display(),
                "include issues: missing include of own header"
            );
        } else if first != hfile {
            warn!(
                file = %cpath.display(),
                header = %hpath.display(),
                "include issues: own header should be the first include"
            );
        }
    }

    if let Some(hpath) = &component.hpath {
        dedupe(hpath, &mut component.includes_in_h);
    }
    if let Some(cpath) = &component.cpath {
        dedupe(cpath, &mut component.includes_in_c);
        let in_header = &component.includes_in_h;
        component.includes_in_c.retain(|include| {
            let redundant = in_header.contains(include);
            if redundant {
                warn!(file = %cpath.display(), %include, "include issues: redundant include");
            }
            !redundant
        });
    }
}

fn dedupe(path: &Path, includes: &mut Vec<Include>) {
    let mut seen = Vec::with_capacity(includes.len());
    includes.retain(|include| {
        if seen.contains(include) {
            warn!(file = %path.display(), %include, "include issues: duplicate include");
            false
        } else {
            seen.push(include.clone());
            true
        }
    });
}

fn disambiguate_names(components: &mut [Component], root: &Path) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for component in components.iter() {
        *counts.entry(component.name.clone()).or_default() += 1;
    }
    for component in components.iter_mut() {
        if counts[&component.name] > 1 {
            let id = component.id_path();
            let renamed = to_posix(id.strip_prefix(root).unwrap_or(id));
            warn!(component = %component.name, renamed = %renamed, "component name collision");
            component.name = renamed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classifies_source_files() {
        assert_eq!(classify("a.h"), Some(SourceKind::Header));
        assert_eq!(classify("a.HPP"), Some(SourceKind::Header));
        assert_eq!(classify("a.h++"), Some(SourceKind::Header));
        assert_eq!(classify("vector"), Some(SourceKind::Header));
        assert_eq!(classify("a.cpp"), Some(SourceKind::Implementation));
        assert_eq!(classify("a.cc"), Some(SourceKind::Implementation));
        assert_eq!(classify("a.c"), Some(SourceKind::Implementation));
        assert_eq!(classify("a.ipp"), Some(SourceKind::Implementation));
        assert_eq!(classify("a.txt"), None);
        assert_eq!(classify("a.b.h"), None);
        assert_eq!(classify("Makefile.am"), None);
    }

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn pairs_by_longest_shared_path() {
        let files = paths(&[
            "/p/include/net/socket.h",
            "/p/include/fs/socket.h",
            "/p/src/net/socket.cpp",
            "/p/src/only.cpp",
            "/p/include/tmpl.hpp",
        ]);
        let mut pairs = pair_files(&files);
        pairs.sort();
        assert_eq!(
            pairs,
            [
                (None, Some(PathBuf::from("/p/src/only.cpp"))),
                (Some(PathBuf::from("/p/include/fs/socket.h")), None),
                (
                    Some(PathBuf::from("/p/include/net/socket.h")),
                    Some(PathBuf::from("/p/src/net/socket.cpp"))
                ),
                (Some(PathBuf::from("/p/include/tmpl.hpp")), None),
            ]
        );
    }

    #[test]
    fn strongest_candidate_chooses_first() {
        // Both sources prefer a/x.h; b/a/x.cpp shares two segments with it.
        let files = paths(&["/r/a/x.h", "/r/c/x.h", "/r/b/a/x.cpp", "/r/d/x.cpp"]);
        let pairs = pair_files(&files);
        assert!(pairs.contains(&(
            Some(PathBuf::from("/r/a/x.h")),
            Some(PathBuf::from("/r/b/a/x.cpp"))
        )));
        assert!(pairs.contains(&(
            Some(PathBuf::from("/r/c/x.h")),
            Some(PathBuf::from("/r/d/x.cpp"))
        )));
    }

    fn component(h: &str, c: &str) -> Component {
        Component {
            name: "a".into(),
            hpath: Some(PathBuf::from("/p/a.h")),
            cpath: Some(PathBuf::from("/p/a.cpp")),
            package: PackageId(0),
            working_dir: PathBuf::from("/p"),
            includes_in_h: Include::scan(h),
            includes_in_c: Include::scan(c),
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn sanitize_removes_duplicate_and_redundant_includes() {
        let mut c = component(
            "#include <vector>\n#include <vector>\n",
            "#include \"a.h\"\n#include <vector>\n#include <map>\n#include <map>\n",
        );
        sanitize_includes(&mut c);
        let h: Vec<String> = c.includes_in_h.iter().map(ToString::to_string).collect();
        let cc: Vec<String> = c.includes_in_c.iter().map(ToString::to_string).collect();
        assert_eq!(h, ["<vector>"]);
        assert_eq!(cc, ["\"a.h\"", "<map>"]);
    }

    #[test]
    fn constructs_components_from_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("src/util")).expect("mkdir");
        fs::write(root.join("src/a.h"), "#include \"util/b.h\"\n").expect("write");
        fs::write(root.join("src/a.cpp"), "#include \"a.h\"\n").expect("write");
        fs::write(root.join("src/util/b.h"), "").expect("write");
        fs::write(root.join("src/util/notes.txt"), "").expect("write");
        fs::write(root.join("src/main.cpp"), "#include \"a.h\"\n").expect("write");

        let config = serde_yaml::from_str("name: p\nsrc: [src]\n").expect("yaml");
        let package =
            Package::new(&config, crate::model::GroupId(0), "g", root).expect("package");
        let components = construct_components(&package, PackageId(0), "g.p").expect("build");
        let mut names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["a", "main", "util/b"]);

        let a = components.iter().find(|c| c.name == "a").expect("a");
        assert!(a.hpath.is_some() && a.cpath.is_some());
        assert_eq!(a.working_dir, root.join("src"));
        assert_eq!(a.includes_in_h.len(), 1);
    }

    #[test]
    fn colliding_names_keep_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("src")).expect("mkdir");
        fs::write(root.join("src/a.h"), "").expect("write");
        fs::write(root.join("src/a.hpp"), "").expect("write");

        let config = serde_yaml::from_str("name: p\nsrc: [src]\n").expect("yaml");
        let package =
            Package::new(&config, crate::model::GroupId(0), "g", root).expect("package");
        let components = construct_components(&package, PackageId(0), "g.p").expect("build");
        let mut names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["a.h", "a.hpp"]);
    }
}
