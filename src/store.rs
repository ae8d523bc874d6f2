//! Content-addressed object access for archive generation.
//!
//! [`ObjectStore`] wraps the primary repository plus an append-only list of
//! alternate stores discovered mid-walk (nested submodule repositories).
//! Lookups consult the primary store first, then each alternate in
//! registration order. The list only ever grows during one archive
//! invocation; appends and reads interleave but never overlap (the walk is
//! strictly sequential).

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{CommitInfo, Ident};

/// A resolved tree-ish: the tree to archive plus commit metadata when the
/// spec named a commit.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    pub tree: gix::ObjectId,
    pub commit: Option<CommitInfo>,
    /// Archive timestamp: the commit's time, or "now" for a bare tree.
    pub time: i64,
}

struct Alternate {
    gitdir: PathBuf,
    repo: gix::Repository,
}

/// The primary repository plus registered alternate stores.
pub struct ObjectStore {
    repo: gix::Repository,
    alternates: RefCell<Vec<Alternate>>,
}

impl ObjectStore {
    /// Open the repository at `path` (a git directory or a worktree root).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = gix::open(path.as_ref()).map_err(Error::git)?;
        Ok(Self {
            repo,
            alternates: RefCell::new(Vec::new()),
        })
    }

    /// Discover a repository from `path` upward, as git itself would.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let repo = gix::discover(path.as_ref()).map_err(Error::git)?;
        Ok(Self {
            repo,
            alternates: RefCell::new(Vec::new()),
        })
    }

    /// Root of the checked-out worktree, if the repository has one.
    pub fn work_dir(&self) -> Option<PathBuf> {
        self.repo.work_dir().map(Path::to_path_buf)
    }

    /// Fetch an object's kind and raw bytes by id.
    ///
    /// The primary store is consulted first, then each alternate in
    /// registration order.
    ///
    /// # Errors
    /// [`Error::NotFound`] when no store holds the object; [`Error::Git`]
    /// for store-level corruption.
    pub fn get(&self, id: gix::ObjectId) -> Result<(gix::object::Kind, Vec<u8>)> {
        if let Some(obj) = self.repo.try_find_object(id).map_err(Error::git)? {
            return Ok((obj.kind, obj.data.clone()));
        }

        for alt in self.alternates.borrow().iter() {
            if let Some(obj) = alt.repo.try_find_object(id).map_err(Error::git)? {
                return Ok((obj.kind, obj.data.clone()));
            }
        }

        Err(Error::not_found(format!("object {}", id)))
    }

    /// Register the repository at `gitdir` as an alternate object store.
    ///
    /// Returns `false` when a store for that path is already registered.
    pub fn add_alternate(&self, gitdir: &Path) -> Result<bool> {
        let canon = gitdir.canonicalize().map_err(|e| Error::io(gitdir, e))?;

        let mut alternates = self.alternates.borrow_mut();
        if alternates.iter().any(|a| a.gitdir == canon) {
            return Ok(false);
        }

        let repo = gix::open(&canon).map_err(Error::git)?;
        log::debug!("registered alternate object store: {}", canon.display());
        alternates.push(Alternate {
            gitdir: canon,
            repo,
        });
        Ok(true)
    }

    pub fn alternate_count(&self) -> usize {
        self.alternates.borrow().len()
    }

    /// Resolve a revision spec (`HEAD`, a branch, a tag, a hex id, ...) to
    /// the tree to archive.
    ///
    /// A spec naming a commit yields that commit's tree plus its metadata
    /// for keyword substitution; a spec naming a tree yields the tree alone
    /// and substitution stays disabled.
    pub fn resolve_treeish(&self, spec: &str) -> Result<ArchiveSource> {
        let id = self
            .repo
            .rev_parse_single(spec)
            .map_err(|_| Error::not_found(format!("revision '{}'", spec)))?
            .detach();

        let (kind, data) = self.get(id)?;
        match kind {
            gix::object::Kind::Commit => {
                let commit = parse_commit(id, &data)?;
                let time = commit.time;
                Ok(ArchiveSource {
                    tree: commit.tree,
                    commit: Some(commit),
                    time,
                })
            }
            gix::object::Kind::Tree => Ok(ArchiveSource {
                tree: id,
                commit: None,
                time: now(),
            }),
            gix::object::Kind::Tag => {
                // Annotated tag: peel to the target and try again.
                let tag = gix::objs::TagRef::from_bytes(&data).map_err(Error::git)?;
                self.resolve_treeish(&tag.target.to_string())
            }
            gix::object::Kind::Blob => Err(Error::not_a_tree(spec)),
        }
    }
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Decode a raw commit object into [`CommitInfo`].
pub(crate) fn parse_commit(id: gix::ObjectId, data: &[u8]) -> Result<CommitInfo> {
    let commit = gix::objs::CommitRef::from_bytes(data).map_err(Error::git)?;
    Ok(CommitInfo {
        id,
        tree: commit.tree(),
        author: Ident {
            name: commit.author.name.to_string(),
            email: commit.author.email.to_string(),
        },
        committer: Ident {
            name: commit.committer.name.to_string(),
            email: commit.committer.email.to_string(),
        },
        time: commit.committer.time.seconds,
        message: commit.message.to_string(),
    })
}
