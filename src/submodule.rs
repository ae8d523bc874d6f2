//! Gitlink handling: deciding whether to descend into a submodule and
//! wiring its object store into the walk.
//!
//! The tree entry for a submodule records a commit id in a *different*
//! repository. Descending requires that repository's objects to be
//! resolvable, so a checkout's git directory is registered as an alternate
//! store before recursion. The recorded commit id is always used for the
//! archive content; whatever HEAD the checkout happens to be on is ignored.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::store::ObjectStore;
use crate::types::SubmodulePolicy;

/// Verdict for a gitlink entry after policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitlinkVerdict {
    /// Emit the directory marker only.
    Marker,
    /// Emit the marker and descend into the recorded commit.
    Descend,
}

/// Apply `policy` to the gitlink at repository-relative `rel_path`,
/// registering the checkout's store as an alternate where one exists.
pub fn check_gitlink(
    store: &ObjectStore,
    policy: SubmodulePolicy,
    rel_path: &str,
) -> Result<GitlinkVerdict> {
    match policy {
        SubmodulePolicy::None => Ok(GitlinkVerdict::Marker),

        // Register any checkout found, but descend regardless: the point is
        // to attempt full traversal even if objects turn out unreachable.
        SubmodulePolicy::All => {
            register_checkout(store, rel_path)?;
            Ok(GitlinkVerdict::Descend)
        }

        // Descend only when a checkout's store was actually found. An
        // absent checkout downgrades this entry to a bare marker.
        SubmodulePolicy::CheckedOut => {
            if register_checkout(store, rel_path)? {
                Ok(GitlinkVerdict::Descend)
            } else {
                Ok(GitlinkVerdict::Marker)
            }
        }
    }
}

/// Locate the submodule checkout's git directory at `<rel_path>/.git` under
/// the worktree and register it as an alternate store.
///
/// Returns `Ok(false)` when no checkout exists there (not an error); the
/// result is also `false` when the same store was registered earlier.
fn register_checkout(store: &ObjectStore, rel_path: &str) -> Result<bool> {
    let Some(work_dir) = store.work_dir() else {
        // Bare repository: no checkouts to find.
        return Ok(false);
    };

    let Some(gitdir) = resolve_gitdir(&work_dir.join(rel_path).join(".git"))? else {
        return Ok(false);
    };
    store.add_alternate(&gitdir)?;
    Ok(true)
}

/// Resolve a `.git` path to the actual git directory, following a gitfile
/// redirect when the path is a file.
///
/// Returns `None` when the path does not exist at all. Any other probe
/// failure is fatal: a present-but-broken submodule signals on-disk
/// corruption, not an optional checkout.
fn resolve_gitdir(path: &Path) -> Result<Option<PathBuf>> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };

    let gitdir = if meta.is_dir() {
        path.to_path_buf()
    } else {
        read_gitfile(path)?
    };

    let objects = gitdir.join("objects");
    match std::fs::metadata(&objects) {
        Ok(m) if m.is_dir() => Ok(Some(gitdir)),
        Ok(_) => Err(Error::submodule_corrupt(format!(
            "{} is not a directory",
            objects.display()
        ))),
        Err(e) => Err(Error::submodule_corrupt(format!(
            "cannot stat {}: {}",
            objects.display(),
            e
        ))),
    }
}

/// Follow a gitfile: a one-line `gitdir: <path>` redirect to the real git
/// directory, with relative targets resolved against the gitfile's parent.
fn read_gitfile(path: &Path) -> Result<PathBuf> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let target = content
        .strip_prefix("gitdir:")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            Error::submodule_corrupt(format!("{} is not a gitdir pointer", path.display()))
        })?;

    let target = Path::new(target);
    let resolved = if target.is_absolute() {
        target.to_path_buf()
    } else {
        path.parent().unwrap_or(Path::new(".")).join(target)
    };

    let meta = std::fs::metadata(&resolved).map_err(|e| {
        Error::submodule_corrupt(format!("cannot stat gitdir {}: {}", resolved.display(), e))
    })?;
    if !meta.is_dir() {
        return Err(Error::submodule_corrupt(format!(
            "gitdir {} is not a directory",
            resolved.display()
        )));
    }
    Ok(resolved)
}
