//! `#include` directives: scanning and header location.

use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::PackageId;
use crate::path::{join_normalized, normalize, to_posix};

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*#\s*include\s*(<(?P<brackets>\S+?)>|"(?P<quotes>\S+?)")"#)
        .expect("include regex is valid")
});

/// One include directive.
///
/// Two includes are equal when they name the same normalized path,
/// regardless of the quoting style.
#[derive(Debug, Clone)]
pub struct Include {
    /// The path as written in the directive.
    pub written: String,
    /// The normalized path.
    pub hfile: PathBuf,
    /// `true` for `"..."`, `false` for `<...>`.
    pub quoted: bool,
}

/// Where an include directive leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// An existing header file.
    File(PathBuf),
    /// The include matched a pattern of an external package.
    Pattern(PackageId),
    /// Nothing found.
    NotFound,
}

impl Include {
    /// Build an include from the path written in a directive.
    #[must_use]
    pub fn new(written: &str, quoted: bool) -> Self {
        Self {
            written: written.to_string(),
            hfile: normalize(Path::new(written)),
            quoted,
        }
    }

    /// Parse one source line.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let captures = INCLUDE_RE.captures(line)?;
        if let Some(path) = captures.name("brackets") {
            Some(Self::new(path.as_str(), false))
        } else {
            captures.name("quotes").map(|path| Self::new(path.as_str(), true))
        }
    }

    /// All include directives in `text`, in order of appearance.
    #[must_use]
    pub fn scan(text: &str) -> Vec<Self> {
        text.lines().filter_map(Self::parse_line).collect()
    }

    /// All include directives of a source file. Invalid UTF-8 is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn grep(path: &Path) -> Result<Vec<Self>> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::scan(&String::from_utf8_lossy(&bytes)))
    }

    /// Final path component of the included file.
    #[must_use]
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.hfile.file_name()
    }

    /// Resolve the directive.
    ///
    /// 1. Quoted includes are first looked up relative to `cwd`.
    /// 2. An include matching one of the `patterns` belongs to that package.
    /// 3. `include_dirs` are searched front to back for quoted includes and
    ///    back to front for angle-bracket includes.
    #[must_use]
    pub fn locate(
        &self,
        cwd: &Path,
        include_dirs: &[PathBuf],
        patterns: &[(PackageId, Vec<Regex>)],
    ) -> Location {
        let find_in = |dir: &PathBuf| {
            let candidate = join_normalized(dir, &self.hfile);
            candidate.is_file().then_some(candidate)
        };

        if self.quoted {
            if let Some(found) = find_in(&cwd.to_path_buf()) {
                return Location::File(found);
            }
        }

        let hfile = to_posix(&self.hfile);
        for (package, regexes) in patterns {
            if regexes.iter().any(|re| re.is_match(&hfile)) {
                return Location::Pattern(*package);
            }
        }

        let found = if self.quoted {
            include_dirs.iter().find_map(find_in)
        } else {
            include_dirs.iter().rev().find_map(find_in)
        };
        found.map_or(Location::NotFound, Location::File)
    }
}

impl PartialEq for Include {
    fn eq(&self, other: &Self) -> bool {
        self.hfile == other.hfile
    }
}

impl Eq for Include {}

impl Hash for Include {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hfile.hash(state);
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.written)
        } else {
            write!(f, "<{}>", self.written)
        }
    }
}
