//! Lexical path helpers.
//!
//! Nothing here touches the filesystem: paths are compared component by
//! component after `.` and `..` have been folded away.

use std::path::{Component, Path, PathBuf};

/// Fold `.` and `..` components without resolving symlinks.
///
/// A `..` at the root stays at the root; a leading `..` of a relative path is
/// kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `normalize(base.join(path))`.
#[must_use]
pub fn join_normalized(base: &Path, path: &Path) -> PathBuf {
    normalize(&base.join(path))
}

/// Deepest directory that is an ancestor of (or equal to) every path.
///
/// Returns `None` for an empty input.
#[must_use]
pub fn common_dir(paths: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = paths.split_first()?;
    let mut common: Vec<Component<'_>> = first.components().collect();
    for path in rest {
        let shared = common
            .iter()
            .zip(path.components())
            .take_while(|(a, b)| *a == b)
            .count();
        common.truncate(shared);
    }
    Some(common.iter().collect())
}

/// Return `true` if `child` is `parent` or lies below it.
#[must_use]
pub fn is_ancestor(parent: &Path, child: &Path) -> bool {
    child.starts_with(parent)
}

/// `path` without its final extension.
#[must_use]
pub fn strip_extension(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// Render `path` with `/` separators.
#[must_use]
pub fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Return `true` if `s` contains glob metacharacters.
#[must_use]
pub fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// Leading components of a glob pattern that contain no metacharacters.
#[must_use]
pub fn literal_base(pattern: &Path) -> PathBuf {
    pattern
        .components()
        .take_while(|c| !has_glob_meta(&c.as_os_str().to_string_lossy()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("../x/./y")), PathBuf::from("../x/y"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn common_dir_is_component_wise() {
        let paths = [PathBuf::from("/p/src/abc"), PathBuf::from("/p/src/abd")];
        assert_eq!(common_dir(&paths), Some(PathBuf::from("/p/src")));
        let single = [PathBuf::from("/p/src")];
        assert_eq!(common_dir(&single), Some(PathBuf::from("/p/src")));
        assert_eq!(common_dir(&[]), None);
    }

    #[test]
    fn ancestor_respects_component_boundaries() {
        assert!(is_ancestor(Path::new("/opt/boost"), Path::new("/opt/boost/any.hpp")));
        assert!(is_ancestor(Path::new("/opt/boost"), Path::new("/opt/boost")));
        assert!(!is_ancestor(Path::new("/opt/boost"), Path::new("/opt/boost_1/any.hpp")));
    }

    #[test]
    fn strip_extension_and_posix() {
        assert_eq!(strip_extension(Path::new("a/b.cpp")), PathBuf::from("a/b"));
        assert_eq!(strip_extension(Path::new("a/vector")), PathBuf::from("a/vector"));
        assert_eq!(to_posix(Path::new("a/b/c")), "a/b/c");
    }

    #[test]
    fn literal_base_stops_at_first_glob() {
        assert_eq!(literal_base(Path::new("/g/src/*/impl")), PathBuf::from("/g/src"));
        assert_eq!(literal_base(Path::new("/g/src")), PathBuf::from("/g/src"));
    }

    proptest! {
        #[test]
        fn common_dir_is_ancestor_of_all(
            parts in prop::collection::vec(prop::collection::vec("[a-c]", 0..4), 1..5)
        ) {
            let paths: Vec<PathBuf> = parts
                .iter()
                .map(|p| Path::new("/").join(p.join("/")))
                .collect();
            let common = common_dir(&paths).expect("non-empty");
            for path in &paths {
                prop_assert!(is_ancestor(&common, path));
            }
        }
    }
}
