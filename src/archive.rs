//! Top-level archive generation.

use crate::attrs::AttributeSource;
use crate::convert::ContentTransform;
use crate::error::Result;
use crate::filter::PathFilter;
use crate::store::{ArchiveSource, ObjectStore};
use crate::subst::CommitFormatter;
use crate::types::{CommitInfo, SubmodulePolicy};
use crate::walk::TreeWalker;
use crate::writer::ArchiveWriter;

/// Everything one archive-generation invocation needs to know.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    /// Root tree to archive.
    pub tree: gix::ObjectId,
    /// Prepended verbatim to every emitted path. May be empty; a trailing
    /// `/` additionally requests an explicit leading directory entry.
    pub prefix: String,
    /// Restriction to a set of path patterns; empty selects everything.
    pub paths: PathFilter,
    pub submodules: SubmodulePolicy,
    /// Report each emitted path through the `log` facade.
    pub verbose: bool,
    /// Commit metadata backing `$Format:...$` substitution. `None` when the
    /// root was resolved from a bare tree id; substitution is then disabled.
    pub commit: Option<CommitInfo>,
}

impl ArchiveRequest {
    /// A request archiving `tree` with defaults: no prefix, no filter, no
    /// submodule recursion.
    pub fn new(tree: gix::ObjectId) -> Self {
        Self {
            tree,
            prefix: String::new(),
            paths: PathFilter::empty(),
            submodules: SubmodulePolicy::None,
            verbose: false,
            commit: None,
        }
    }

    /// A request seeded from a resolved tree-ish.
    pub fn from_source(source: &ArchiveSource) -> Self {
        let mut request = Self::new(source.tree);
        request.commit = source.commit.clone();
        request
    }
}

/// Walk the requested tree and stream every selected entry into `writer`,
/// then finalize the archive.
///
/// Collaborators are injected per invocation; nothing here consults global
/// state. On error the walk stops immediately and entries already handed to
/// the writer remain in whatever partial output it produced.
pub fn write_archive(
    store: &ObjectStore,
    request: &ArchiveRequest,
    attrs: &dyn AttributeSource,
    transform: &dyn ContentTransform,
    formatter: &dyn CommitFormatter,
    writer: &mut dyn ArchiveWriter,
) -> Result<()> {
    TreeWalker::new(store, request, attrs, transform, formatter).write_entries(writer)?;
    writer.finish()
}
