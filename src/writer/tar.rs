//! Tar and gzip-compressed tar encoders.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Error, Result};
use crate::types::FileMode;
use crate::writer::{ArchiveWriter, WriterOptions};

/// Normalized permission bits, git-archive style: archives carry canonical
/// modes, not whatever the odb happened to store.
fn permissions(mode: FileMode) -> u32 {
    match mode {
        FileMode::Regular { executable: true } => 0o755,
        FileMode::Regular { executable: false } => 0o644,
        FileMode::Symlink => 0o777,
        FileMode::Directory | FileMode::Submodule => 0o755,
    }
}

fn header(mode: FileMode, size: u64, mtime: i64) -> ::tar::Header {
    let mut h = ::tar::Header::new_gnu();
    h.set_entry_type(match mode {
        FileMode::Directory | FileMode::Submodule => ::tar::EntryType::Directory,
        FileMode::Symlink => ::tar::EntryType::Symlink,
        FileMode::Regular { .. } => ::tar::EntryType::Regular,
    });
    h.set_mode(permissions(mode));
    h.set_size(size);
    h.set_mtime(mtime.max(0) as u64);
    h.set_uid(0);
    h.set_gid(0);
    h
}

fn append_entry<W: Write>(
    builder: &mut ::tar::Builder<W>,
    path: &str,
    mode: FileMode,
    content: &[u8],
    mtime: i64,
) -> Result<()> {
    match mode {
        FileMode::Symlink => {
            // Symlink content is the raw target path; tar stores it in the
            // link-name field, not as entry data.
            let target = String::from_utf8_lossy(content);
            let mut h = header(mode, 0, mtime);
            builder
                .append_link(&mut h, path, target.as_ref())
                .map_err(Error::from)?;
        }
        _ => {
            let mut h = header(mode, content.len() as u64, mtime);
            builder
                .append_data(&mut h, path, content)
                .map_err(Error::from)?;
        }
    }
    Ok(())
}

/// Plain uncompressed tar.
pub struct TarWriter {
    builder: ::tar::Builder<Box<dyn Write>>,
    mtime: i64,
}

impl TarWriter {
    pub fn new(out: Box<dyn Write>, mtime: i64) -> Self {
        Self {
            builder: ::tar::Builder::new(out),
            mtime,
        }
    }
}

impl ArchiveWriter for TarWriter {
    fn begin_directory(&mut self, path: &str, mode: FileMode) -> Result<()> {
        append_entry(&mut self.builder, path, mode, &[], self.mtime)
    }

    fn write_file(&mut self, path: &str, mode: FileMode, content: &[u8]) -> Result<()> {
        append_entry(&mut self.builder, path, mode, content, self.mtime)
    }

    fn finish(&mut self) -> Result<()> {
        self.builder.finish().map_err(Error::from)
    }
}

/// Gzip-compressed tar (`tar.gz` / `tgz`).
pub struct TarGzWriter {
    builder: ::tar::Builder<GzEncoder<Box<dyn Write>>>,
    mtime: i64,
}

impl TarGzWriter {
    pub fn new(out: Box<dyn Write>, options: WriterOptions) -> Self {
        let level = options
            .compression_level
            .map(Compression::new)
            .unwrap_or_default();
        Self {
            builder: ::tar::Builder::new(GzEncoder::new(out, level)),
            mtime: options.mtime,
        }
    }
}

impl ArchiveWriter for TarGzWriter {
    fn begin_directory(&mut self, path: &str, mode: FileMode) -> Result<()> {
        append_entry(&mut self.builder, path, mode, &[], self.mtime)
    }

    fn write_file(&mut self, path: &str, mode: FileMode, content: &[u8]) -> Result<()> {
        append_entry(&mut self.builder, path, mode, content, self.mtime)
    }

    fn finish(&mut self) -> Result<()> {
        self.builder.finish()?;
        self.builder.get_mut().try_finish().map_err(Error::from)
    }
}
