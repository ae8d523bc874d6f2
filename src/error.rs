use std::path::PathBuf;

/// All errors produced by gitarc.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An object referenced by a tree entry could not be read from the
    /// primary store or any registered alternate.
    #[error("cannot read object {id} for '{path}'")]
    ObjectUnreadable {
        path: String,
        id: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A tree entry's mode disagrees with the stored object's actual type.
    #[error("integrity mismatch at '{path}': {detail}")]
    IntegrityMismatch { path: String, detail: String },

    /// A gitlink path exists on disk but is not a usable repository.
    #[error("submodule corrupt: {0}")]
    SubmoduleCorrupt(String),

    /// Format/compression/remote misuse, detected before traversal begins.
    #[error("unsupported option: {0}")]
    UnsupportedOption(String),

    #[error("unknown archive format '{0}'")]
    UnknownFormat(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a tree object: {0}")]
    NotATree(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// An encoder (tar/zip) failed while serializing an entry.
    #[error("archive encoding failed: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("git error: {0}")]
    Git(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl Error {
    pub fn object_unreadable(path: impl Into<String>, id: impl ToString) -> Self {
        Self::ObjectUnreadable {
            path: path.into(),
            id: id.to_string(),
            source: None,
        }
    }

    pub fn object_unreadable_because(
        path: impl Into<String>,
        id: impl ToString,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ObjectUnreadable {
            path: path.into(),
            id: id.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn integrity(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::IntegrityMismatch {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn submodule_corrupt(msg: impl Into<String>) -> Self {
        Self::SubmoduleCorrupt(msg.into())
    }

    pub fn unsupported_option(msg: impl Into<String>) -> Self {
        Self::UnsupportedOption(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn not_a_tree(what: impl Into<String>) -> Self {
        Self::NotATree(what.into())
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    pub fn encode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Encode(Box::new(err))
    }

    pub fn git(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Git(Box::new(err))
    }

    pub fn git_msg(msg: impl Into<String>) -> Self {
        Self::Git(msg.into().into())
    }

    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            err.kind(),
            format!("{}: {}", path.into().display(), err),
        ))
    }
}
