//! Archive encoders and the format registry.
//!
//! The walk hands [`ArchiveWriter`] a flat, pre-ordered stream of directory
//! markers and file entries; the writer owns all byte-level encoding. New
//! formats plug in by name through [`lookup_format`].

pub mod tar;
pub mod zip;

use std::io::Write;

use crate::error::{Error, Result};
use crate::types::FileMode;

/// Consumes the entry stream produced by the walk.
///
/// Directory paths always arrive with a trailing `/`; file paths never do.
/// Entries arrive in pre-order: a directory strictly before everything
/// beneath it.
pub trait ArchiveWriter {
    fn begin_directory(&mut self, path: &str, mode: FileMode) -> Result<()>;
    fn write_file(&mut self, path: &str, mode: FileMode, content: &[u8]) -> Result<()>;
    /// Flush trailers and finalize the output stream.
    fn finish(&mut self) -> Result<()>;
}

/// A supported archive format.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveFormat {
    pub name: &'static str,
    alias: Option<&'static str>,
    /// Whether the format honors a compression level.
    pub compression: bool,
}

const FORMATS: &[ArchiveFormat] = &[
    ArchiveFormat {
        name: "tar",
        alias: None,
        compression: false,
    },
    ArchiveFormat {
        name: "tar.gz",
        alias: Some("tgz"),
        compression: true,
    },
    ArchiveFormat {
        name: "zip",
        alias: None,
        compression: true,
    },
];

/// All supported formats, in listing order.
pub fn formats() -> &'static [ArchiveFormat] {
    FORMATS
}

/// Find a format by name or alias.
pub fn lookup_format(name: &str) -> Option<&'static ArchiveFormat> {
    FORMATS
        .iter()
        .find(|f| f.name == name || f.alias == Some(name))
}

/// Writer construction parameters shared by all formats.
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    /// Compression level `0..=9`; `None` means the format's default.
    pub compression_level: Option<u32>,
    /// Entry timestamp, seconds since the epoch.
    pub mtime: i64,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compression_level: None,
            mtime: 0,
        }
    }
}

/// Validate options against a format and construct its writer.
///
/// # Errors
/// [`Error::UnsupportedOption`] when a compression level is given for a
/// format without compression or lies outside `0..=9`. This runs before any
/// output is produced.
pub fn new_writer(
    format: &ArchiveFormat,
    out: Box<dyn Write>,
    options: WriterOptions,
) -> Result<Box<dyn ArchiveWriter>> {
    if let Some(level) = options.compression_level {
        if !format.compression {
            return Err(Error::unsupported_option(format!(
                "compression level -{} not supported for format '{}'",
                level, format.name
            )));
        }
        if level > 9 {
            return Err(Error::unsupported_option(format!(
                "compression level {} out of range 0..=9",
                level
            )));
        }
    }

    Ok(match format.name {
        "tar" => Box::new(tar::TarWriter::new(out, options.mtime)),
        "tar.gz" => Box::new(tar::TarGzWriter::new(out, options)),
        "zip" => Box::new(zip::ZipArchiveWriter::new(out, options)),
        other => return Err(Error::UnknownFormat(other.into())),
    })
}
