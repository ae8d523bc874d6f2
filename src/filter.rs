//! Pathspec restriction for archive walks.
//!
//! [`PathFilter`] limits a walk to the subtrees and files named by a set of
//! path patterns. Patterns without wildcards are prefix specs (`"src"`
//! includes everything under `src/`); patterns containing `*` or `?` are
//! matched with [`fnmatch`] against the full repository-relative path, with
//! `*` free to cross `/` boundaries.

use crate::error::Result;
use crate::paths::normalize_path;

/// Simple fnmatch implementation: `*` matches any chars (including `/`),
/// `?` matches a single char.
pub fn fnmatch(pat: &[u8], name: &[u8]) -> bool {
    let mut pi = 0;
    let mut ni = 0;
    let mut star_pi = usize::MAX;
    let mut star_ni = 0;

    while ni < name.len() {
        if pi < pat.len() && (pat[pi] == b'?' || pat[pi] == name[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < pat.len() && pat[pi] == b'*' {
            star_pi = pi;
            star_ni = ni;
            pi += 1;
        } else if star_pi != usize::MAX {
            pi = star_pi + 1;
            star_ni += 1;
            ni = star_ni;
        } else {
            return false;
        }
    }

    while pi < pat.len() && pat[pi] == b'*' {
        pi += 1;
    }

    pi == pat.len()
}

/// Verdict for a directory entry under a [`PathFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirMatch {
    /// The directory itself matched; the entire subtree is included and no
    /// further filter checks are needed below it.
    Include,
    /// Some pattern points below this directory; emit it and keep filtering
    /// inside.
    Descend,
    /// Nothing in the filter can match under this directory.
    Skip,
}

/// A set of path patterns restricting which entries reach the writer.
///
/// An empty filter matches everything. Patterns are normalized on
/// construction; `..` segments are rejected.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    specs: Vec<String>,
}

impl PathFilter {
    /// A filter that matches every path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a filter from raw pattern strings.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidPath`] for patterns containing `..`.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut specs = Vec::new();
        for p in patterns {
            let norm = normalize_path(p.as_ref())?;
            if !norm.is_empty() {
                specs.push(norm);
            }
        }
        Ok(Self { specs })
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Whether a file at `path` is selected by the filter.
    pub fn matches_file(&self, path: &str) -> bool {
        if self.specs.is_empty() {
            return true;
        }
        self.specs.iter().any(|s| {
            s == path
                || path_under(path, s)
                || (has_wildcard(s) && fnmatch(s.as_bytes(), path.as_bytes()))
        })
    }

    /// Classify a directory at `path` (no trailing slash).
    pub fn match_dir(&self, path: &str) -> DirMatch {
        if self.specs.is_empty() {
            return DirMatch::Include;
        }

        let mut verdict = DirMatch::Skip;
        for s in &self.specs {
            if s == path
                || path_under(path, s)
                || (has_wildcard(s) && fnmatch(s.as_bytes(), path.as_bytes()))
            {
                return DirMatch::Include;
            }
            // A spec below this directory, or a wildcard that may match
            // deeper paths, keeps the walk going.
            if path_under(s, path) || has_wildcard(s) {
                verdict = DirMatch::Descend;
            }
        }
        verdict
    }
}

/// `true` when `path` lies strictly inside the directory `dir`.
fn path_under(path: &str, dir: &str) -> bool {
    path.len() > dir.len() && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/'
}

fn has_wildcard(spec: &str) -> bool {
    spec.bytes().any(|b| b == b'*' || b == b'?')
}
