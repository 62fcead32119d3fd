//! File existence checks used to tell file markers from plain text.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Answers "does this path refer to an existing file".
///
/// The resolvers only open a `File` or `Figure` frame when the oracle
/// confirms the path, so this is what separates `(./main.tex` from
/// `(see above)`.
pub trait FileOracle {
    fn exists(&self, path: &str) -> bool;
}

impl<F> FileOracle for F
where
    F: Fn(&str) -> bool,
{
    fn exists(&self, path: &str) -> bool {
        self(path)
    }
}

/// Checks the real filesystem, resolving relative paths against `root`.
///
/// The engine reports paths relative to the directory it was started in, so
/// `root` should be that directory.
#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
}

impl Default for Filesystem {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Filesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileOracle for Filesystem {
    fn exists(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let candidate = Path::new(path);
        let found = if candidate.is_absolute() {
            candidate.is_file()
        } else {
            self.root.join(candidate).is_file()
        };
        log::trace!("oracle: {} -> {}", path, found);
        found
    }
}

/// A fixed set of paths that exist. Useful when replaying transcripts away
/// from the machine that produced them.
#[derive(Debug, Clone, Default)]
pub struct KnownFiles {
    paths: HashSet<String>,
}

impl KnownFiles {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Into<String>> FromIterator<S> for KnownFiles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl FileOracle for KnownFiles {
    fn exists(&self, path: &str) -> bool {
        self.paths.contains(path)
    }
}
