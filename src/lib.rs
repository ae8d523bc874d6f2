//! Generate tar, tar.gz, and zip archives from git tree snapshots.
//!
//! `gitarc` materializes a point-in-time snapshot of a repository's tree
//! graph into a linear entry stream and hands it to a pluggable archive
//! encoder. The traversal honors per-path export attributes
//! (`export-ignore`, `export-subst`), restricts output to a set of path
//! patterns, expands `$Format:...$` keywords from commit metadata, and can
//! descend into submodules by registering their object stores as alternates
//! mid-walk.
//!
//! # Key types
//!
//! - [`ObjectStore`] — opens a repository and resolves object ids, falling
//!   back to alternate stores registered during the walk.
//! - [`ArchiveRequest`] — one archive invocation: root tree, prefix, path
//!   filter, submodule policy, optional commit metadata.
//! - [`write_archive`] — drives the walk and feeds an [`ArchiveWriter`].
//! - [`lookup_format`] / [`new_writer`] — select and construct an encoder
//!   (`tar`, `tar.gz`, `zip`) by name.
//!
//! # Quick example
//!
//! ```rust,no_run
//! use gitarc::{
//!     attrs::NoAttributes, convert::Identity, subst::PlaceholderFormatter,
//!     ArchiveRequest, ObjectStore,
//! };
//!
//! let store = ObjectStore::discover(".").unwrap();
//! let source = store.resolve_treeish("HEAD").unwrap();
//!
//! let mut request = ArchiveRequest::from_source(&source);
//! request.prefix = "project-1.0/".into();
//!
//! let format = gitarc::lookup_format("tar").unwrap();
//! let out = Box::new(std::fs::File::create("project.tar").unwrap());
//! let mut writer = gitarc::new_writer(
//!     format,
//!     out,
//!     gitarc::WriterOptions { compression_level: None, mtime: source.time },
//! )
//! .unwrap();
//!
//! gitarc::write_archive(
//!     &store,
//!     &request,
//!     &NoAttributes,
//!     &Identity,
//!     &PlaceholderFormatter,
//!     writer.as_mut(),
//! )
//! .unwrap();
//! ```

pub mod archive;
pub mod attrs;
pub mod convert;
pub mod error;
pub mod filter;
pub mod paths;
pub mod store;
pub mod submodule;
pub mod subst;
pub mod types;
pub mod walk;
pub mod writer;

// Re-export primary public types at crate root.
pub use archive::{write_archive, ArchiveRequest};
pub use attrs::{AttrRules, AttributeSource, ExportAttrs};
pub use error::{Error, Result};
pub use filter::PathFilter;
pub use store::{ArchiveSource, ObjectStore};
pub use submodule::GitlinkVerdict;
pub use subst::{CommitFormatter, PlaceholderFormatter};
pub use types::*;
pub use walk::TreeWalker;
pub use writer::{
    formats, lookup_format, new_writer, ArchiveFormat, ArchiveWriter, WriterOptions,
};
