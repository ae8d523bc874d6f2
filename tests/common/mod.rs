//! Shared helpers: build real repositories object-by-object and record the
//! entry stream a walk produces.

use std::path::Path;

use gix::objs::tree::{Entry, EntryMode};
use gix::refs::transaction::PreviousValue;

use gitarc::{ArchiveWriter, FileMode, Result as GitarcResult};

pub const MODE_BLOB: u32 = 0o100644;
#[allow(dead_code)]
pub const MODE_BLOB_EXEC: u32 = 0o100755;
#[allow(dead_code)]
pub const MODE_LINK: u32 = 0o120000;
pub const MODE_TREE: u32 = 0o040000;
#[allow(dead_code)]
pub const MODE_GITLINK: u32 = 0o160000;

pub fn init_bare(dir: &Path) -> gix::Repository {
    std::fs::create_dir_all(dir).unwrap();
    gix::init_bare(dir).unwrap()
}

#[allow(dead_code)]
pub fn init_worktree(dir: &Path) -> gix::Repository {
    std::fs::create_dir_all(dir).unwrap();
    gix::init(dir).unwrap()
}

pub fn blob(repo: &gix::Repository, data: &[u8]) -> gix::ObjectId {
    repo.write_blob(data).unwrap().detach()
}

/// Write a tree from `(name, mode, oid)` triples, sorting entries into
/// git's canonical order (directories compare as `name/`).
pub fn tree(repo: &gix::Repository, entries: &[(&str, u32, gix::ObjectId)]) -> gix::ObjectId {
    let mut entries: Vec<Entry> = entries
        .iter()
        .map(|(name, mode, oid)| Entry {
            mode: EntryMode::try_from(*mode).unwrap(),
            filename: (*name).into(),
            oid: *oid,
        })
        .collect();
    entries.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    repo.write_object(&gix::objs::Tree { entries }).unwrap().detach()
}

fn sort_key(entry: &Entry) -> Vec<u8> {
    let mut key = entry.filename.to_vec();
    if entry.mode.is_tree() {
        key.push(b'/');
    }
    key
}

pub fn commit(repo: &gix::Repository, tree: gix::ObjectId, message: &str) -> gix::ObjectId {
    let time = gix::date::Time::new(1_700_000_000, 0);
    let actor = gix::actor::Signature {
        name: "Test Author".into(),
        email: "test@example.com".into(),
        time,
    };
    let commit = gix::objs::Commit {
        tree,
        parents: vec![].into(),
        author: actor.clone(),
        committer: actor,
        encoding: None,
        message: message.into(),
        extra_headers: vec![],
    };
    repo.write_object(&commit).unwrap().detach()
}

pub fn set_branch(repo: &gix::Repository, name: &str, target: gix::ObjectId) {
    let refname = format!("refs/heads/{}", name);
    // Reflog creation in non-bare repos needs a committer identity; set one
    // in an in-memory config snapshot so the ref edit can commit.
    let mut repo = repo.clone();
    {
        let mut config = repo.config_snapshot_mut();
        config
            .set_value(&gix::config::tree::User::NAME, "Test Author")
            .unwrap();
        config
            .set_value(&gix::config::tree::User::EMAIL, "test@example.com")
            .unwrap();
        config.commit().unwrap();
    }
    repo.reference(refname.as_str(), target, PreviousValue::Any, "test setup")
        .unwrap();
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// One entry the walk handed to the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Dir(String, FileMode),
    File(String, FileMode, Vec<u8>),
}

impl Event {
    pub fn path(&self) -> &str {
        match self {
            Event::Dir(p, _) => p,
            Event::File(p, _, _) => p,
        }
    }
}

/// An [`ArchiveWriter`] that records the entry stream for assertions.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
    pub finished: bool,
}

impl ArchiveWriter for Recorder {
    fn begin_directory(&mut self, path: &str, mode: FileMode) -> GitarcResult<()> {
        self.events.push(Event::Dir(path.to_string(), mode));
        Ok(())
    }

    fn write_file(&mut self, path: &str, mode: FileMode, content: &[u8]) -> GitarcResult<()> {
        self.events
            .push(Event::File(path.to_string(), mode, content.to_vec()));
        Ok(())
    }

    fn finish(&mut self) -> GitarcResult<()> {
        self.finished = true;
        Ok(())
    }
}

impl Recorder {
    pub fn paths(&self) -> Vec<&str> {
        self.events.iter().map(Event::path).collect()
    }

    #[allow(dead_code)]
    pub fn file_content(&self, path: &str) -> Option<&[u8]> {
        self.events.iter().find_map(|e| match e {
            Event::File(p, _, content) if p == path => Some(content.as_slice()),
            _ => None,
        })
    }
}
