// ---------------------------------------------------------------------------
// Mode constants
// ---------------------------------------------------------------------------

pub const MODE_BLOB: u32 = 0o100644;
pub const MODE_BLOB_EXEC: u32 = 0o100755;
pub const MODE_LINK: u32 = 0o120000;
pub const MODE_TREE: u32 = 0o040000;
pub const MODE_GITLINK: u32 = 0o160000;

// ---------------------------------------------------------------------------
// FileMode
// ---------------------------------------------------------------------------

/// The mode of a git tree entry, as seen by the archive pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    Regular { executable: bool },
    Directory,
    Symlink,
    /// A gitlink: the entry names a commit in a nested repository.
    Submodule,
}

impl FileMode {
    /// Convert a raw git mode to a `FileMode`.
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode {
            MODE_BLOB => Some(Self::Regular { executable: false }),
            MODE_BLOB_EXEC => Some(Self::Regular { executable: true }),
            MODE_LINK => Some(Self::Symlink),
            MODE_TREE => Some(Self::Directory),
            MODE_GITLINK => Some(Self::Submodule),
            _ => None,
        }
    }

    /// Convert to a raw git mode.
    pub fn to_mode(self) -> u32 {
        match self {
            Self::Regular { executable: false } => MODE_BLOB,
            Self::Regular { executable: true } => MODE_BLOB_EXEC,
            Self::Symlink => MODE_LINK,
            Self::Directory => MODE_TREE,
            Self::Submodule => MODE_GITLINK,
        }
    }

    /// Whether this entry carries blob content (regular file or symlink).
    pub fn is_blob(self) -> bool {
        matches!(self, Self::Regular { .. } | Self::Symlink)
    }

    pub fn is_file(self) -> bool {
        matches!(self, Self::Regular { .. })
    }

    pub fn is_link(self) -> bool {
        matches!(self, Self::Symlink)
    }

    /// Whether this entry is emitted as a directory marker (tree or gitlink).
    pub fn is_dirlike(self) -> bool {
        matches!(self, Self::Directory | Self::Submodule)
    }

    pub fn is_submodule(self) -> bool {
        matches!(self, Self::Submodule)
    }
}

// ---------------------------------------------------------------------------
// SubmodulePolicy
// ---------------------------------------------------------------------------

/// Whether gitlink entries are descended into during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmodulePolicy {
    /// Never recurse; emit only the directory marker.
    #[default]
    None,
    /// Recurse only when a checkout's repository was found and registered.
    CheckedOut,
    /// Always attempt recursion, registering any checkout found on the way.
    All,
}

impl SubmodulePolicy {
    /// Parse the CLI spelling (`none` / `checkedout` / `all`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "checkedout" => Some(Self::CheckedOut),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CommitInfo
// ---------------------------------------------------------------------------

/// Author/committer identity.
#[derive(Debug, Clone, Default)]
pub struct Ident {
    pub name: String,
    pub email: String,
}

/// Metadata of the commit an archive was resolved from.
///
/// Present only when the requested tree-ish peeled to a commit; a bare tree
/// id yields no `CommitInfo`, which in turn disables keyword substitution.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: gix::ObjectId,
    pub tree: gix::ObjectId,
    pub author: Ident,
    pub committer: Ident,
    /// Committer timestamp, seconds since the epoch.
    pub time: i64,
    pub message: String,
}

impl CommitInfo {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}
