//! The traversal driver: depth-first, pre-order descent over a tree graph,
//! producing the ordered entry stream an [`ArchiveWriter`] consumes.
//!
//! Entries are visited in the tree's stored order; no re-sorting happens
//! here (git trees are already name-sorted, and downstream encoders rely on
//! that contract). Each entry passes through attribute policy, path-filter
//! restriction, and — for regular files — the fetch/convert/substitute
//! content pipeline. The walk is strictly sequential and aborts on the
//! first unrecoverable error; output already handed to the writer stays.

use log::info;

use crate::archive::ArchiveRequest;
use crate::attrs::AttributeSource;
use crate::convert::ContentTransform;
use crate::error::{Error, Result};
use crate::filter::DirMatch;
use crate::paths;
use crate::store::ObjectStore;
use crate::submodule::{self, GitlinkVerdict};
use crate::subst::{self, CommitFormatter};
use crate::types::FileMode;
use crate::writer::ArchiveWriter;

/// Outcome of visiting one tree entry.
///
/// The recursion decision is a first-class value; errors travel separately
/// in `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// Move on to the next sibling.
    Next,
    /// Descend into the entry's subtree. `unfiltered` is set once a
    /// directory fully matched the path filter, so descendants skip
    /// filter checks.
    Recurse { unfiltered: bool },
}

/// Drives one archive generation over an [`ObjectStore`].
pub struct TreeWalker<'a> {
    store: &'a ObjectStore,
    request: &'a ArchiveRequest,
    attrs: &'a dyn AttributeSource,
    transform: &'a dyn ContentTransform,
    formatter: &'a dyn CommitFormatter,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        store: &'a ObjectStore,
        request: &'a ArchiveRequest,
        attrs: &'a dyn AttributeSource,
        transform: &'a dyn ContentTransform,
        formatter: &'a dyn CommitFormatter,
    ) -> Self {
        Self {
            store,
            request,
            attrs,
            transform,
            formatter,
        }
    }

    /// Emit every selected entry to `writer`, in canonical order.
    ///
    /// A prefix ending in `/` first emits a synthetic directory entry for
    /// the prefix itself (with runs of trailing slashes collapsed), so
    /// prefixed archives always carry an explicit leading directory.
    pub fn write_entries(&self, writer: &mut dyn ArchiveWriter) -> Result<()> {
        let prefix = &self.request.prefix;
        if !prefix.is_empty() && prefix.ends_with('/') {
            let collapsed = paths::collapse_trailing_slashes(prefix);
            if self.request.verbose {
                info!("{}", collapsed);
            }
            writer.begin_directory(collapsed, FileMode::Directory)?;
        }

        self.walk_tree(
            self.request.tree,
            "",
            self.request.paths.is_empty(),
            writer,
        )
    }

    /// Visit every entry of the tree at `tree_id`, recursing depth-first.
    ///
    /// `rel_prefix` is the repository-relative path of the tree (empty at
    /// the root); `unfiltered` is set once an enclosing directory fully
    /// matched the path filter.
    fn walk_tree(
        &self,
        tree_id: gix::ObjectId,
        rel_prefix: &str,
        unfiltered: bool,
        writer: &mut dyn ArchiveWriter,
    ) -> Result<()> {
        let label = if rel_prefix.is_empty() {
            "<root>"
        } else {
            rel_prefix
        };
        let (kind, data) = self
            .store
            .get(tree_id)
            .map_err(|e| Error::object_unreadable_because(label, tree_id, e))?;
        if kind != gix::object::Kind::Tree {
            return Err(Error::integrity(
                label,
                format!("expected a tree, found a {}", kind),
            ));
        }
        let tree = gix::objs::TreeRef::from_bytes(&data).map_err(Error::git)?;

        for entry in &tree.entries {
            let name = String::from_utf8_lossy(entry.filename).into_owned();
            let rel = paths::join(rel_prefix, &name);
            let mode_bits = entry.mode.0 as u32;
            let Some(mode) = FileMode::from_mode(mode_bits) else {
                return Err(Error::integrity(
                    &rel,
                    format!("unsupported entry mode {:o}", mode_bits),
                ));
            };
            let oid = entry.oid.to_owned();

            match self.visit_entry(oid, &rel, mode, unfiltered, writer)? {
                Visit::Next => {}
                Visit::Recurse { unfiltered } => {
                    // A gitlink records a commit in the nested repository;
                    // archive that exact commit's tree, never the nested
                    // checkout's live HEAD.
                    let subtree = if mode.is_submodule() {
                        self.tree_of_commit(oid, &rel)?
                    } else {
                        oid
                    };
                    self.walk_tree(subtree, &rel, unfiltered, writer)?;
                }
            }
        }
        Ok(())
    }

    fn visit_entry(
        &self,
        oid: gix::ObjectId,
        rel: &str,
        mode: FileMode,
        unfiltered: bool,
        writer: &mut dyn ArchiveWriter,
    ) -> Result<Visit> {
        // Attribute lookups are repository-relative and never fatal.
        let attrs = self.attrs.lookup(rel).unwrap_or_default();

        // Hard exclusion: overrides any path filter that would include it,
        // and prunes the whole subtree for directories.
        if attrs.ignore {
            return Ok(Visit::Next);
        }

        if mode.is_dirlike() {
            let unfiltered = if unfiltered {
                true
            } else {
                match self.request.paths.match_dir(rel) {
                    DirMatch::Include => true,
                    DirMatch::Descend => false,
                    DirMatch::Skip => return Ok(Visit::Next),
                }
            };

            let apath = format!("{}{}/", self.request.prefix, rel);
            if self.request.verbose {
                info!("{}", apath);
            }
            writer.begin_directory(&apath, mode)?;

            if mode.is_submodule() {
                let policy = self.request.submodules;
                match submodule::check_gitlink(self.store, policy, rel)? {
                    GitlinkVerdict::Marker => Ok(Visit::Next),
                    GitlinkVerdict::Descend => Ok(Visit::Recurse { unfiltered }),
                }
            } else {
                Ok(Visit::Recurse { unfiltered })
            }
        } else {
            if !unfiltered && !self.request.paths.matches_file(rel) {
                return Ok(Visit::Next);
            }

            let content = self.file_content(oid, rel, mode, attrs.subst)?;
            let apath = format!("{}{}", self.request.prefix, rel);
            if self.request.verbose {
                info!("{}", apath);
            }
            writer.write_file(&apath, mode, &content)?;
            Ok(Visit::Next)
        }
    }

    /// Fetch, convert, and substitute the content of a blob entry.
    ///
    /// Symlink content is the raw target path; only regular files pass
    /// through the transform and keyword substitution, and substitution
    /// additionally requires a commit on the request.
    fn file_content(
        &self,
        oid: gix::ObjectId,
        rel: &str,
        mode: FileMode,
        subst_attr: bool,
    ) -> Result<Vec<u8>> {
        let (kind, data) = match self.store.get(oid) {
            Ok(found) => found,
            Err(Error::NotFound(_)) => return Err(Error::object_unreadable(rel, oid)),
            Err(e) => return Err(Error::object_unreadable_because(rel, oid, e)),
        };
        if kind != gix::object::Kind::Blob {
            return Err(Error::integrity(
                rel,
                format!("tree records a blob entry but object {} is a {}", oid, kind),
            ));
        }

        if !mode.is_file() {
            return Ok(data);
        }

        let data = self.transform.convert(rel, data)?;
        match (&self.request.commit, subst_attr) {
            (Some(commit), true) => Ok(subst::expand(&data, commit, self.formatter)),
            _ => Ok(data),
        }
    }

    /// Resolve a gitlink's recorded commit to the tree it snapshots.
    fn tree_of_commit(&self, oid: gix::ObjectId, rel: &str) -> Result<gix::ObjectId> {
        let (kind, data) = match self.store.get(oid) {
            Ok(found) => found,
            Err(Error::NotFound(_)) => return Err(Error::object_unreadable(rel, oid)),
            Err(e) => return Err(Error::object_unreadable_because(rel, oid, e)),
        };
        if kind != gix::object::Kind::Commit {
            return Err(Error::integrity(
                rel,
                format!("gitlink names object {} which is a {}", oid, kind),
            ));
        }
        let commit = gix::objs::CommitRef::from_bytes(&data).map_err(Error::git)?;
        Ok(commit.tree())
    }
}
