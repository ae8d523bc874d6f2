mod common;

use common::{Recorder, MODE_BLOB, MODE_GITLINK};
use gitarc::attrs::NoAttributes;
use gitarc::convert::Identity;
use gitarc::subst::PlaceholderFormatter;
use gitarc::{write_archive, ArchiveRequest, Error, FileMode, ObjectStore, SubmodulePolicy};

fn fake_commit_id() -> gix::ObjectId {
    gix::ObjectId::from_hex(b"bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb").unwrap()
}

/// Bare superproject whose tree carries one file and one gitlink.
fn super_repo(dir: &std::path::Path, gitlink: gix::ObjectId) -> (ObjectStore, gix::ObjectId) {
    let repo = common::init_bare(dir);
    let a = common::blob(&repo, b"top");
    let root = common::tree(
        &repo,
        &[("a.txt", MODE_BLOB, a), ("sub", MODE_GITLINK, gitlink)],
    );
    (ObjectStore::open(dir).unwrap(), root)
}

fn walk(store: &ObjectStore, request: &ArchiveRequest) -> gitarc::Result<Recorder> {
    let mut recorder = Recorder::default();
    write_archive(
        store,
        request,
        &NoAttributes,
        &Identity,
        &PlaceholderFormatter,
        &mut recorder,
    )?;
    Ok(recorder)
}

#[test]
fn policy_none_emits_a_bare_marker() {
    let dir = tempfile::tempdir().unwrap();
    let (store, root) = super_repo(dir.path(), fake_commit_id());

    let recorder = walk(&store, &ArchiveRequest::new(root)).unwrap();
    assert_eq!(recorder.paths(), vec!["a.txt", "sub/"]);
    assert_eq!(
        recorder.events[1],
        common::Event::Dir("sub/".into(), FileMode::Submodule)
    );
}

#[test]
fn checked_out_without_a_checkout_degrades_to_marker() {
    let dir = tempfile::tempdir().unwrap();
    let (store, root) = super_repo(dir.path(), fake_commit_id());

    // Bare superproject: there is no worktree to find a checkout under.
    let mut request = ArchiveRequest::new(root);
    request.submodules = SubmodulePolicy::CheckedOut;
    let recorder = walk(&store, &request).unwrap();
    assert_eq!(recorder.paths(), vec!["a.txt", "sub/"]);
    assert_eq!(store.alternate_count(), 0);
}

#[test]
fn policy_all_with_unreachable_objects_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (store, root) = super_repo(dir.path(), fake_commit_id());

    let mut request = ArchiveRequest::new(root);
    request.submodules = SubmodulePolicy::All;
    let err = walk(&store, &request).unwrap_err();
    match err {
        Error::ObjectUnreadable { path, .. } => assert_eq!(path, "sub"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn checked_out_descends_into_the_recorded_commit() {
    let dir = tempfile::tempdir().unwrap();
    let super_dir = dir.path().join("super");
    let super_git = common::init_worktree(&super_dir);

    // Nested checkout at super/sub with two commits; HEAD moves on to the
    // second while the superproject records the first.
    let nested = common::init_worktree(&super_dir.join("sub"));
    let old = common::blob(&nested, b"recorded");
    let old_tree = common::tree(&nested, &[("old.txt", MODE_BLOB, old)]);
    let recorded = common::commit(&nested, old_tree, "first\n");
    let new = common::blob(&nested, b"live");
    let new_tree = common::tree(&nested, &[("new.txt", MODE_BLOB, new)]);
    let live = common::commit(&nested, new_tree, "second\n");
    common::set_branch(&nested, "main", live);

    let a = common::blob(&super_git, b"top");
    let root = common::tree(
        &super_git,
        &[("a.txt", MODE_BLOB, a), ("sub", MODE_GITLINK, recorded)],
    );

    let store = ObjectStore::open(&super_dir).unwrap();
    let mut request = ArchiveRequest::new(root);
    request.submodules = SubmodulePolicy::CheckedOut;
    let recorder = walk(&store, &request).unwrap();

    assert_eq!(recorder.paths(), vec!["a.txt", "sub/", "sub/old.txt"]);
    assert_eq!(recorder.file_content("sub/old.txt").unwrap(), b"recorded");
    assert_eq!(store.alternate_count(), 1);
}
