//! Per-path export attributes.
//!
//! The walk consults exactly two attributes for every entry: `export-ignore`
//! (drop the entry and its subtree from the archive) and `export-subst`
//! (expand `$Format:...$` tokens in the entry's content). Lookup failures
//! are never fatal; they read as "both unset".
//!
//! [`AttrRules`] is a deliberately small rule list in the gitattributes
//! style, enough to honor an in-tree `.gitattributes`: one pattern plus
//! attribute names per line, `-name` to unset, last matching rule wins.
//! Patterns containing `/` are matched against the full relative path,
//! others against the basename only.

use crate::error::Result;
use crate::filter::fnmatch;

/// The two attribute values relevant to archiving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportAttrs {
    pub ignore: bool,
    pub subst: bool,
}

/// Resolves export attributes for repository-relative paths.
///
/// Paths handed to `lookup` are always relative to the repository root,
/// never include the archive prefix, and never carry a trailing slash.
pub trait AttributeSource {
    fn lookup(&self, path: &str) -> Result<ExportAttrs>;
}

/// An attribute source with no rules: every path gets the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAttributes;

impl AttributeSource for NoAttributes {
    fn lookup(&self, _path: &str) -> Result<ExportAttrs> {
        Ok(ExportAttrs::default())
    }
}

// ---------------------------------------------------------------------------
// AttrRules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrName {
    ExportIgnore,
    ExportSubst,
}

/// A single parsed rule: a pattern plus the attribute states it sets.
#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    attr: AttrName,
    /// `false` when the line spelled `-export-ignore` / `-export-subst`.
    set: bool,
}

/// Gitattributes-style rules for `export-ignore` / `export-subst`.
#[derive(Debug, Clone, Default)]
pub struct AttrRules {
    rules: Vec<Rule>,
}

impl AttrRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules from gitattributes-style text.
    ///
    /// Blank lines, comments, unrelated attributes, and malformed lines are
    /// skipped silently; this parser never fails.
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let Some(pattern) = fields.next() else {
                continue;
            };
            for field in fields {
                let (set, name) = match field.strip_prefix('-') {
                    Some(rest) => (false, rest),
                    None => (true, field),
                };
                let attr = match name {
                    "export-ignore" => AttrName::ExportIgnore,
                    "export-subst" => AttrName::ExportSubst,
                    _ => continue,
                };
                rules.push(Rule {
                    pattern: pattern.trim_end_matches('/').to_string(),
                    attr,
                    set,
                });
            }
        }
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Read export rules from a `.gitattributes` blob at the root of `tree`.
    ///
    /// Attribute resolution must never break an archive run, so every
    /// failure mode (no such entry, unreadable blob, non-blob entry) yields
    /// an empty rule set.
    pub fn from_tree(store: &crate::store::ObjectStore, tree: gix::ObjectId) -> Self {
        let Ok((kind, data)) = store.get(tree) else {
            return Self::default();
        };
        if kind != gix::object::Kind::Tree {
            return Self::default();
        }
        let Ok(tree) = gix::objs::TreeRef::from_bytes(&data) else {
            return Self::default();
        };
        let Some(entry) = tree
            .entries
            .iter()
            .find(|e| e.filename == b".gitattributes".as_slice())
        else {
            return Self::default();
        };
        match store.get(entry.oid.to_owned()) {
            Ok((gix::object::Kind::Blob, blob)) => {
                Self::parse(&String::from_utf8_lossy(&blob))
            }
            _ => Self::default(),
        }
    }
}

impl AttributeSource for AttrRules {
    fn lookup(&self, path: &str) -> Result<ExportAttrs> {
        let mut attrs = ExportAttrs::default();
        for rule in &self.rules {
            if !match_pattern(&rule.pattern, path) {
                continue;
            }
            match rule.attr {
                AttrName::ExportIgnore => attrs.ignore = rule.set,
                AttrName::ExportSubst => attrs.subst = rule.set,
            }
        }
        Ok(attrs)
    }
}

/// Match a rule pattern against a relative path.
///
/// Patterns containing `/` match the full path; others match the basename.
fn match_pattern(pattern: &str, path: &str) -> bool {
    if pattern.contains('/') {
        fnmatch(pattern.as_bytes(), path.as_bytes())
    } else {
        let basename = path.rsplit('/').next().unwrap_or(path);
        fnmatch(pattern.as_bytes(), basename.as_bytes())
    }
}
