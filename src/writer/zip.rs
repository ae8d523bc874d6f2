//! Zip encoder.
//!
//! The zip container needs a seekable sink for its central directory, so
//! entries are assembled in an in-memory cursor and copied to the output
//! stream on `finish`. Level 0 selects stored (uncompressed) entries, any
//! other level deflate, matching git-archive's zip behavior.

use std::io::{Cursor, Write};

use chrono::{Datelike, TimeZone, Timelike, Utc};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{Error, Result};
use crate::types::FileMode;
use crate::writer::{ArchiveWriter, WriterOptions};

pub struct ZipArchiveWriter {
    // `None` after finish; the zip finalizer consumes the writer.
    inner: Option<zip::ZipWriter<Cursor<Vec<u8>>>>,
    out: Box<dyn Write>,
    method: CompressionMethod,
    level: Option<i64>,
    mtime: zip::DateTime,
}

impl ZipArchiveWriter {
    pub fn new(out: Box<dyn Write>, options: WriterOptions) -> Self {
        let (method, level) = match options.compression_level {
            Some(0) => (CompressionMethod::Stored, None),
            Some(n) => (CompressionMethod::Deflated, Some(n as i64)),
            None => (CompressionMethod::Deflated, None),
        };
        Self {
            inner: Some(zip::ZipWriter::new(Cursor::new(Vec::new()))),
            out,
            method,
            level,
            mtime: dos_datetime(options.mtime),
        }
    }

    fn options(&self, mode: FileMode) -> SimpleFileOptions {
        let unix_mode = match mode {
            FileMode::Regular { executable: true } => 0o755,
            FileMode::Regular { executable: false } => 0o644,
            FileMode::Symlink => 0o120777,
            FileMode::Directory | FileMode::Submodule => 0o755,
        };
        SimpleFileOptions::default()
            .compression_method(self.method)
            .compression_level(self.level)
            .last_modified_time(self.mtime)
            .unix_permissions(unix_mode)
    }

    fn writer(&mut self) -> Result<&mut zip::ZipWriter<Cursor<Vec<u8>>>> {
        self.inner
            .as_mut()
            .ok_or_else(|| Error::git_msg("zip writer already finished"))
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn begin_directory(&mut self, path: &str, mode: FileMode) -> Result<()> {
        let opts = self.options(mode);
        self.writer()?
            .add_directory(path.trim_end_matches('/'), opts)
            .map_err(Error::encode)
    }

    fn write_file(&mut self, path: &str, mode: FileMode, content: &[u8]) -> Result<()> {
        let opts = self.options(mode);
        let zip = self.writer()?;
        match mode {
            FileMode::Symlink => {
                let target = String::from_utf8_lossy(content);
                zip.add_symlink(path, target.as_ref(), opts)
                    .map_err(Error::encode)?;
            }
            _ => {
                zip.start_file(path, opts).map_err(Error::encode)?;
                zip.write_all(content)?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let zip = self
            .inner
            .take()
            .ok_or_else(|| Error::git_msg("zip writer already finished"))?;
        let cursor = zip.finish().map_err(Error::encode)?;
        self.out.write_all(cursor.get_ref())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Convert an epoch timestamp to zip's DOS datetime, clamping anything
/// before the DOS epoch (1980) to the format's default.
fn dos_datetime(seconds: i64) -> zip::DateTime {
    let Some(dt) = Utc.timestamp_opt(seconds, 0).single() else {
        return zip::DateTime::default();
    };
    if dt.year() < 1980 || dt.year() > 2107 {
        return zip::DateTime::default();
    }
    zip::DateTime::from_date_and_time(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
    )
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn zip_entries_roundtrip() {
        let sink = Sink::default();
        let mut w = ZipArchiveWriter::new(
            Box::new(sink.clone()),
            WriterOptions {
                compression_level: Some(6),
                mtime: 1_700_000_000,
            },
        );
        w.begin_directory("proj/", FileMode::Directory).unwrap();
        w.write_file(
            "proj/a.txt",
            FileMode::Regular { executable: false },
            b"alpha",
        )
        .unwrap();
        w.finish().unwrap();

        let bytes = sink.0.borrow().clone();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "proj/"));
        assert!(names.iter().any(|n| n == "proj/a.txt"));

        let mut file = archive.by_name("proj/a.txt").unwrap();
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut file, &mut content).unwrap();
        assert_eq!(content, b"alpha");
    }

    #[test]
    fn level_zero_stores() {
        let sink = Sink::default();
        let mut w = ZipArchiveWriter::new(
            Box::new(sink.clone()),
            WriterOptions {
                compression_level: Some(0),
                mtime: 0,
            },
        );
        w.write_file("f", FileMode::Regular { executable: false }, b"data")
            .unwrap();
        w.finish().unwrap();

        let bytes = sink.0.borrow().clone();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let file = archive.by_index(0).unwrap();
        assert_eq!(file.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn finish_twice_errors() {
        let mut w = ZipArchiveWriter::new(Box::new(Vec::new()), WriterOptions::default());
        w.finish().unwrap();
        assert!(w.finish().is_err());
    }

    #[test]
    fn pre_1980_mtime_clamped() {
        // Should not panic; falls back to the DOS default timestamp.
        let _ = dos_datetime(0);
        let _ = dos_datetime(-1);
    }
}
